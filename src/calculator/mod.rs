//! Infix arithmetic calculator
//!
//! Evaluates whitespace-separated expressions such as `( size + 2 ) * 3` with
//! the shunting-yard algorithm: one stack of pending values, one stack of
//! pending operators, reduced according to precedence and associativity.

use crate::error::EvaluationError;
use crate::tokenizer::words;
use crate::value::Value;
use crate::variables::Environment;
use tracing::trace;

type EvalResult<T> = std::result::Result<T, EvaluationError>;

/// Operators understood by the calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    LeftParen,
    RightParen,
    Power,
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
}

impl Operator {
    /// Look up the operator spelled by a word
    pub fn from_symbol(word: &str) -> Option<Operator> {
        match word {
            "(" => Some(Operator::LeftParen),
            ")" => Some(Operator::RightParen),
            "^" => Some(Operator::Power),
            "*" => Some(Operator::Multiply),
            "/" => Some(Operator::Divide),
            "%" => Some(Operator::Modulo),
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Subtract),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::LeftParen => '(',
            Operator::RightParen => ')',
            Operator::Power => '^',
            Operator::Multiply => '*',
            Operator::Divide => '/',
            Operator::Modulo => '%',
            Operator::Add => '+',
            Operator::Subtract => '-',
        }
    }

    /// Binding strength (higher binds tighter)
    pub fn precedence(self) -> u8 {
        match self {
            Operator::LeftParen | Operator::RightParen => 150,
            Operator::Power => 130,
            Operator::Multiply | Operator::Divide | Operator::Modulo => 120,
            Operator::Add | Operator::Subtract => 110,
        }
    }

    pub fn is_left_associative(self) -> bool {
        !matches!(self, Operator::Power)
    }

    /// Whether `self`, sitting on the operator stack, must be applied before
    /// `incoming` is pushed
    pub fn executes_before(self, incoming: Operator) -> bool {
        self.precedence() > incoming.precedence()
            || (self.precedence() == incoming.precedence() && self.is_left_associative())
    }

    /// Combine two operands. Parentheses are structural and have no reducer.
    pub fn apply(self, left: f64, right: f64) -> Option<f64> {
        match self {
            Operator::Power => Some(left.powf(right)),
            Operator::Multiply => Some(left * right),
            Operator::Divide => Some(left / right),
            Operator::Modulo => Some(left % right),
            Operator::Add => Some(left + right),
            Operator::Subtract => Some(left - right),
            Operator::LeftParen | Operator::RightParen => None,
        }
    }

    /// Pop two operands (right first), push the result
    fn reduce(self, values: &mut Vec<Value>) -> EvalResult<()> {
        let missing = EvaluationError::MissingOperand(self.symbol());
        let right = values.pop().ok_or_else(|| missing.clone())?;
        let left = values.pop().ok_or_else(|| missing.clone())?;
        let result = self
            .apply(left.as_f64(), right.as_f64())
            .ok_or(EvaluationError::MismatchedParenthesis)?;
        values.push(Value::new(result));
        Ok(())
    }
}

/// Evaluate an expression against a set of variable bindings
pub fn evaluate(text: &str, variables: &Environment) -> EvalResult<Value> {
    let mut values: Vec<Value> = Vec::new();
    let mut operators: Vec<Operator> = Vec::new();

    for word in words(text) {
        match Operator::from_symbol(word) {
            Some(Operator::LeftParen) => operators.push(Operator::LeftParen),
            Some(Operator::RightParen) => loop {
                match operators.pop() {
                    Some(Operator::LeftParen) => break,
                    Some(op) => op.reduce(&mut values)?,
                    None => return Err(EvaluationError::MismatchedParenthesis),
                }
            },
            Some(op) => {
                while let Some(&top) = operators.last() {
                    if top == Operator::LeftParen || !top.executes_before(op) {
                        break;
                    }
                    operators.pop();
                    top.reduce(&mut values)?;
                }
                operators.push(op);
            }
            None => values.push(operand(word, variables)?),
        }
    }

    while let Some(op) = operators.pop() {
        if op == Operator::LeftParen {
            return Err(EvaluationError::MismatchedParenthesis);
        }
        op.reduce(&mut values)?;
    }

    match values.as_slice() {
        [value] => {
            trace!(expression = text, result = value.as_f64(), "evaluated");
            Ok(*value)
        }
        [] => Err(EvaluationError::Empty),
        many => Err(EvaluationError::DanglingOperands(many.len())),
    }
}

/// Resolve a literal or a variable reference
fn operand(word: &str, variables: &Environment) -> EvalResult<Value> {
    if Value::looks_numeric(word) {
        return Ok(word.parse()?);
    }
    if Environment::is_valid_name(word) {
        return variables
            .get(word)
            .ok_or_else(|| EvaluationError::UnboundIdentifier(word.to_string()));
    }
    Ok(word.parse()?)
}

/// Calculator bound to one environment
#[derive(Debug, Clone, Copy)]
pub struct Calculator<'a> {
    variables: &'a Environment,
}

impl<'a> Calculator<'a> {
    pub fn new(variables: &'a Environment) -> Self {
        Self { variables }
    }

    pub fn eval(&self, text: &str) -> EvalResult<Value> {
        evaluate(text, self.variables)
    }

    pub fn eval_f64(&self, text: &str) -> EvalResult<f64> {
        self.eval(text).map(Value::as_f64)
    }
}
