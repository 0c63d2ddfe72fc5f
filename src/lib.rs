//! Turtle Script
//!
//! A small line-oriented language that drives a turtle: a cursor with a
//! position, a heading and a pen. Scripts assign variables and issue motion
//! commands whose arguments are infix arithmetic expressions. The turtle
//! records the traced path and reports every change to registered listeners,
//! which is the only way a renderer learns about it.

pub mod calculator;
pub mod cancel;
pub mod config;
pub mod executor;
pub mod parser;
pub mod path;
pub mod tokenizer;
pub mod turtle;
pub mod value;
pub mod variables;
pub mod worker;

// Re-export core types for convenience
pub use crate::error::{
    CommandError, EngineError, EvaluationError, Result, ScriptError, TokenError, TurtleError,
};
pub use calculator::{evaluate, Calculator, Operator};
pub use cancel::CancelToken;
pub use config::TurtleConfig;
pub use executor::Interpreter;
pub use parser::{parse_line, Command, Statement, Verb};
pub use path::{Path, Point, Segment};
pub use turtle::{Change, ListenerId, Turtle, TurtleEvent, TurtleListener};
pub use value::Value;
pub use variables::Environment;
pub use worker::RunWorker;

/// Error taxonomy for tokenizing, evaluating, interpreting and moving
pub mod error {
    use thiserror::Error;

    /// Result type for turtle operations
    pub type Result<T> = std::result::Result<T, TurtleError>;

    /// A word that looked like a number but did not parse as one
    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum TokenError {
        #[error("malformed number \"{0}\"")]
        MalformedNumber(String),
    }

    /// Failures of the expression calculator
    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum EvaluationError {
        #[error(transparent)]
        Token(#[from] TokenError),
        #[error("mismatched parenthesis")]
        MismatchedParenthesis,
        #[error("operator '{0}' is missing an operand")]
        MissingOperand(char),
        #[error("unknown variable \"{0}\"")]
        UnboundIdentifier(String),
        #[error("invalid expression: {0} values without operator")]
        DanglingOperands(usize),
        #[error("empty expression")]
        Empty,
    }

    /// Line-level parse failures
    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum CommandError {
        #[error("invalid command \"{0}\"")]
        UnknownCommand(String),
        #[error("missing argument for {0}")]
        MissingArgument(&'static str),
        #[error("{0} takes no argument")]
        UnexpectedArgument(&'static str),
        #[error("empty name")]
        EmptyName,
        #[error("invalid variable name \"{0}\"")]
        InvalidName(String),
    }

    /// Rejected turtle state changes
    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum EngineError {
        #[error("negative delay: {0}")]
        NegativeDelay(i64),
        #[error("{what} must be a finite number, got {value}")]
        NotFinite { what: &'static str, value: f64 },
    }

    /// Any failure that stops a run
    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum TurtleError {
        #[error(transparent)]
        Evaluation(#[from] EvaluationError),
        #[error(transparent)]
        Command(#[from] CommandError),
        #[error(transparent)]
        Engine(#[from] EngineError),
        #[error("run cancelled")]
        Cancelled,
    }

    impl From<TokenError> for TurtleError {
        fn from(err: TokenError) -> Self {
            TurtleError::Evaluation(EvaluationError::Token(err))
        }
    }

    /// A failure tied to the script line that caused it
    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("line {line}: {error} (\"{text}\")")]
    pub struct ScriptError {
        /// 1-based line number
        pub line: usize,
        /// Raw text of the offending line
        pub text: String,
        #[source]
        pub error: TurtleError,
    }

    impl ScriptError {
        pub fn new(line: usize, text: impl Into<String>, error: impl Into<TurtleError>) -> Self {
            Self {
                line,
                text: text.into(),
                error: error.into(),
            }
        }

        /// True when the run stopped because it was cancelled
        pub fn is_cancelled(&self) -> bool {
            self.error == TurtleError::Cancelled
        }
    }
}
