//! Tokenizer for turtle scripts
//!
//! Splits expression text into whitespace-delimited words and scripts into
//! numbered lines. Both are lazy and consumed once.

use std::str::{Lines, SplitWhitespace};

/// Lazy sequence of whitespace-delimited words in source order
#[derive(Debug, Clone)]
pub struct Words<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Iterator for Words<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Split text into words. Blank input yields nothing.
pub fn words(text: &str) -> Words<'_> {
    Words {
        inner: text.split_whitespace(),
    }
}

/// Script lines paired with their 1-based line number
#[derive(Debug, Clone)]
pub struct ScriptLines<'a> {
    inner: Lines<'a>,
    line_number: usize,
}

impl<'a> Iterator for ScriptLines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.inner.next()?;
        self.line_number += 1;
        Some((self.line_number, line))
    }
}

/// Split a script into numbered lines (`\n` or `\r\n` terminated)
pub fn lines(script: &str) -> ScriptLines<'_> {
    ScriptLines {
        inner: script.lines(),
        line_number: 0,
    }
}

/// Check whether a line carries nothing to execute (blank or `#` comment)
pub fn is_comment_or_blank(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}
