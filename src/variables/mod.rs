//! Variable storage for turtle scripts
//!
//! Maps identifiers to values. Populated by `name = expression` lines and
//! consulted by the calculator whenever a bare identifier appears.

use crate::value::Value;
use std::collections::HashMap;

/// Variable bindings for one script run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    variables: HashMap<String, Value>,
}

impl Environment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
        }
    }

    /// Bind a variable, returning the value it replaced
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.variables.insert(name.into(), value)
    }

    /// Get a variable's value
    pub fn get(&self, name: &str) -> Option<Value> {
        self.variables.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Bindings sorted by name
    pub fn sorted(&self) -> Vec<(&str, Value)> {
        let mut entries: Vec<_> = self
            .variables
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Clear all variables
    pub fn clear(&mut self) {
        self.variables.clear();
    }

    /// Identifier rule: an ASCII letter or `_`, then letters, digits or `_`
    pub fn is_valid_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    }
}
