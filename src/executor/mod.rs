//! Execution engine for turtle scripts
//!
//! Runs scripts line by line: assignments update the variable environment,
//! commands evaluate their argument and drive the turtle. The first failure
//! stops the run and is reported with its line number; effects of earlier
//! lines stay in place.

use crate::calculator::Calculator;
use crate::cancel::CancelToken;
use crate::config::{TurtleConfig, DEFAULT_TURN_DEGREES};
use crate::error::{CommandError, EngineError, Result, ScriptError, TurtleError};
use crate::parser::{parse_line, Command, Statement, Verb};
use crate::tokenizer::lines;
use crate::turtle::Turtle;
use crate::variables::Environment;
use tracing::{debug, info};

/// Script interpreter owning its variables and its turtle
#[derive(Debug)]
pub struct Interpreter {
    variables: Environment,
    turtle: Turtle,
    config: TurtleConfig,
}

impl Interpreter {
    /// Create an interpreter with the default configuration
    pub fn new() -> Self {
        Self::with_config(TurtleConfig::default())
    }

    pub fn with_config(config: TurtleConfig) -> Self {
        let turtle = Turtle::with_config(&config);
        Self::with_turtle(turtle, config)
    }

    /// Drive an existing turtle (listeners already attached, for example)
    pub fn with_turtle(turtle: Turtle, config: TurtleConfig) -> Self {
        Self {
            variables: Environment::new(),
            turtle,
            config,
        }
    }

    /// Token that stops the current run at the next line or animation pause.
    ///
    /// This is always the token the turtle pauses on. A cancelled token stays
    /// cancelled; call `reset` on it before reusing the interpreter.
    pub fn cancel_token(&self) -> CancelToken {
        self.turtle.cancel_token().clone()
    }

    pub fn variables(&self) -> &Environment {
        &self.variables
    }

    pub fn turtle(&self) -> &Turtle {
        &self.turtle
    }

    pub fn turtle_mut(&mut self) -> &mut Turtle {
        &mut self.turtle
    }

    /// Run a whole script.
    ///
    /// Variables start empty unless the configuration retains them.
    pub fn run(&mut self, script: &str) -> std::result::Result<(), ScriptError> {
        if !self.config.retain_variables {
            self.variables.clear();
        }
        info!(lines = script.lines().count(), "run started");
        for (line_number, line) in lines(script) {
            self.execute_line(line_number, line)?;
        }
        info!(
            x = self.turtle.position().x,
            y = self.turtle.position().y,
            segments = self.turtle.path().len(),
            "run finished"
        );
        Ok(())
    }

    /// Execute one script line, tagging a failure with its line number
    pub fn execute_line(
        &mut self,
        line_number: usize,
        line: &str,
    ) -> std::result::Result<(), ScriptError> {
        self.execute(line_number, line)
            .map_err(|error| ScriptError::new(line_number, line, error))
    }

    fn execute(&mut self, line_number: usize, line: &str) -> Result<()> {
        if self.turtle.cancel_token().is_cancelled() {
            return Err(TurtleError::Cancelled);
        }
        match parse_line(line)? {
            Some(statement) => {
                debug!(line = line_number, text = line.trim(), "execute");
                self.execute_statement(&statement)
            }
            None => Ok(()),
        }
    }

    /// Execute a parsed statement
    pub fn execute_statement(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::Assignment { name, expression } => {
                let value = Calculator::new(&self.variables).eval(expression)?;
                debug!(name = name.as_str(), value = value.as_f64(), "assign");
                self.variables.set(name.as_str(), value);
                Ok(())
            }
            Statement::Command(command) => self.execute_command(command),
        }
    }

    fn execute_command(&mut self, command: &Command) -> Result<()> {
        match command.verb {
            Verb::Delay => {
                let milliseconds = self.required(command)?;
                if !milliseconds.is_finite() {
                    return Err(EngineError::NotFinite {
                        what: "delay",
                        value: milliseconds,
                    }
                    .into());
                }
                self.turtle.set_delay(milliseconds.trunc() as i64)
            }
            Verb::Reset => {
                self.turtle.reset();
                Ok(())
            }
            Verb::Forward => {
                let distance = self.required(command)?;
                self.turtle.forward(distance)
            }
            Verb::Backward => {
                let distance = self.required(command)?;
                self.turtle.backward(distance)
            }
            Verb::Left => {
                let degrees = self.optional(command)?;
                self.turtle.left(degrees)
            }
            Verb::Right => {
                let degrees = self.optional(command)?;
                self.turtle.right(degrees)
            }
            Verb::PenUp => {
                self.turtle.pen_up();
                Ok(())
            }
            Verb::PenDown => {
                self.turtle.pen_down();
                Ok(())
            }
        }
    }

    /// Evaluate a required argument
    fn required(&self, command: &Command) -> Result<f64> {
        let text = command
            .argument
            .as_deref()
            .ok_or(CommandError::MissingArgument(command.verb.name()))?;
        Ok(Calculator::new(&self.variables).eval_f64(text)?)
    }

    /// Evaluate a turn angle, defaulting to a right angle
    fn optional(&self, command: &Command) -> Result<f64> {
        match command.argument.as_deref() {
            Some(text) if !text.trim().is_empty() => {
                Ok(Calculator::new(&self.variables).eval_f64(text)?)
            }
            _ => Ok(DEFAULT_TURN_DEGREES),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
