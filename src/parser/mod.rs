//! Parser for turtle script lines
//!
//! Classifies one line of script text as either a variable assignment or a
//! turtle command. Argument expressions are kept as text; the executor
//! evaluates them against the variables bound at that point of the run.

use crate::error::CommandError;
use crate::tokenizer::is_comment_or_blank;
use crate::variables::Environment;

type ParseResult<T> = std::result::Result<T, CommandError>;

/// How many arguments a verb takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    Optional,
    Required,
}

/// Turtle commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Delay,
    Reset,
    Forward,
    Backward,
    Left,
    Right,
    PenUp,
    PenDown,
}

impl Verb {
    /// Match a command word, ignoring case
    pub fn from_word(word: &str) -> Option<Verb> {
        match word.to_ascii_lowercase().as_str() {
            "delay" => Some(Verb::Delay),
            "reset" => Some(Verb::Reset),
            "forward" | "move" => Some(Verb::Forward),
            "backward" | "back" => Some(Verb::Backward),
            "left" => Some(Verb::Left),
            "right" => Some(Verb::Right),
            "up" | "penup" => Some(Verb::PenUp),
            "down" | "pendown" => Some(Verb::PenDown),
            _ => None,
        }
    }

    /// Canonical spelling
    pub fn name(self) -> &'static str {
        match self {
            Verb::Delay => "delay",
            Verb::Reset => "reset",
            Verb::Forward => "forward",
            Verb::Backward => "backward",
            Verb::Left => "left",
            Verb::Right => "right",
            Verb::PenUp => "up",
            Verb::PenDown => "down",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            Verb::Delay | Verb::Forward | Verb::Backward => Arity::Required,
            Verb::Left | Verb::Right => Arity::Optional,
            Verb::Reset | Verb::PenUp | Verb::PenDown => Arity::None,
        }
    }
}

/// A verb with its unevaluated argument
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub verb: Verb,
    pub argument: Option<String>,
}

/// One executable script line
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `name = expression`
    Assignment { name: String, expression: String },
    /// `verb [argument]`
    Command(Command),
}

/// Parse a line. Blank lines and `#` comments give `None`.
pub fn parse_line(line: &str) -> ParseResult<Option<Statement>> {
    if is_comment_or_blank(line) {
        return Ok(None);
    }
    let line = line.trim();

    if let Some((name, expression)) = line.split_once('=') {
        return parse_assignment(name, expression).map(Some);
    }

    parse_command(line).map(|command| Some(Statement::Command(command)))
}

/// Parse the two halves of `name = expression`
fn parse_assignment(name: &str, expression: &str) -> ParseResult<Statement> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CommandError::EmptyName);
    }
    if !Environment::is_valid_name(name) {
        return Err(CommandError::InvalidName(name.to_string()));
    }
    Ok(Statement::Assignment {
        name: name.to_string(),
        expression: expression.trim().to_string(),
    })
}

/// Parse `verb [argument]`, checking the argument against the verb's arity
fn parse_command(line: &str) -> ParseResult<Command> {
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let verb = Verb::from_word(word).ok_or_else(|| CommandError::UnknownCommand(line.to_string()))?;
    let argument = (!rest.is_empty()).then(|| rest.to_string());

    match (verb.arity(), &argument) {
        (Arity::Required, None) => Err(CommandError::MissingArgument(verb.name())),
        (Arity::None, Some(_)) => Err(CommandError::UnexpectedArgument(verb.name())),
        _ => Ok(Command { verb, argument }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> Command {
        match parse_line(line) {
            Ok(Some(Statement::Command(command))) => command,
            other => panic!("expected command for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   \t"), Ok(None));
        assert_eq!(parse_line("# draw a square"), Ok(None));
        assert_eq!(parse_line("   #indented"), Ok(None));
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_line("size = 10 * 2"),
            Ok(Some(Statement::Assignment {
                name: "size".to_string(),
                expression: "10 * 2".to_string()
            }))
        );
    }

    #[test]
    fn test_parse_assignment_without_spaces() {
        assert_eq!(
            parse_line("  n=4"),
            Ok(Some(Statement::Assignment {
                name: "n".to_string(),
                expression: "4".to_string()
            }))
        );
    }

    #[test]
    fn test_assignment_splits_on_first_equals() {
        assert_eq!(
            parse_line("a = b = 3"),
            Ok(Some(Statement::Assignment {
                name: "a".to_string(),
                expression: "b = 3".to_string()
            }))
        );
    }

    #[test]
    fn test_assignment_errors() {
        assert_eq!(parse_line("= 5"), Err(CommandError::EmptyName));
        assert_eq!(parse_line("   = 5"), Err(CommandError::EmptyName));
        assert_eq!(
            parse_line("2x = 5"),
            Err(CommandError::InvalidName("2x".to_string()))
        );
        assert_eq!(
            parse_line("forward x = 5"),
            Err(CommandError::InvalidName("forward x".to_string()))
        );
    }

    #[test]
    fn test_parse_commands_with_argument() {
        let cmd = command("forward 10 + x");
        assert_eq!(cmd.verb, Verb::Forward);
        assert_eq!(cmd.argument.as_deref(), Some("10 + x"));

        assert_eq!(command("delay 50").verb, Verb::Delay);
        assert_eq!(command("backward 3").verb, Verb::Backward);
    }

    #[test]
    fn test_verbs_are_case_insensitive() {
        assert_eq!(command("FORWARD 1").verb, Verb::Forward);
        assert_eq!(command("Left").verb, Verb::Left);
        assert_eq!(command("PenUp").verb, Verb::PenUp);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(command("move 5").verb, Verb::Forward);
        assert_eq!(command("back 5").verb, Verb::Backward);
        assert_eq!(command("penup").verb, Verb::PenUp);
        assert_eq!(command("up").verb, Verb::PenUp);
        assert_eq!(command("pendown").verb, Verb::PenDown);
        assert_eq!(command("down").verb, Verb::PenDown);
    }

    #[test]
    fn test_optional_argument() {
        assert_eq!(command("left").argument, None);
        assert_eq!(command("right   ").argument, None);
        assert_eq!(command("right\t45").argument.as_deref(), Some("45"));
    }

    #[test]
    fn test_missing_argument() {
        assert_eq!(parse_line("forward"), Err(CommandError::MissingArgument("forward")));
        assert_eq!(parse_line("back  "), Err(CommandError::MissingArgument("backward")));
        assert_eq!(parse_line("delay"), Err(CommandError::MissingArgument("delay")));
    }

    #[test]
    fn test_unexpected_argument() {
        assert_eq!(parse_line("reset 1"), Err(CommandError::UnexpectedArgument("reset")));
        assert_eq!(parse_line("up now"), Err(CommandError::UnexpectedArgument("up")));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_line("jump 10"),
            Err(CommandError::UnknownCommand("jump 10".to_string()))
        );
        assert_eq!(
            parse_line("forwards"),
            Err(CommandError::UnknownCommand("forwards".to_string()))
        );
    }
}
