//! error types for compiling and evaluating expressions
//!
//! three layers, matching the three ways an expression can fail:
//! - [`TokenizeError`]: the text can not be split into tokens, compilation fails
//! - [`SyntaxError`]: the tokens do not form an expression, that execution fails
//! - [`EvalError`]: a runtime coercion failure, carried as a value until the root

use thiserror::Error;

/// error produced while splitting source text into tokens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// a character that can not start any token
    #[error("illegal character '{found}' at offset {offset}")]
    IllegalCharacter { found: char, offset: usize },

    /// `|` or `&` not followed by itself
    #[error(
        "illegal character {} after '{after}' at offset {offset}, expected '{after}'",
        describe(.found)
    )]
    IllegalAfter {
        after: char,
        found: Option<char>,
        offset: usize,
    },

    /// a quoted string with no closing quote
    #[error("unterminated string opened with {quote} at offset {offset}")]
    UnterminatedString { quote: char, offset: usize },

    /// two-character operator the language does not define (`>~`, `<~`)
    #[error("unknown operator '{raw}' at offset {offset}")]
    UnknownOperator { raw: String, offset: usize },

    /// a numeric run that does not parse as a float
    #[error("invalid number '{raw}' at offset {offset}")]
    InvalidNumber { raw: String, offset: usize },
}

fn describe(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("'{}'", c),
        None => "end of input".to_string(),
    }
}

/// error produced when the token stream is not a well-formed expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// a token that can not appear here, or trailing tokens after a complete expression
    #[error("unexpected token '{found}' at position {position}")]
    UnexpectedToken { found: String, position: usize },

    /// `(` never closed
    #[error("unclosed '(' at position {position}")]
    UnclosedParen { position: usize },

    /// input ended where an operand was expected
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// `(`, `!` or unary `-` nested deeper than the evaluator allows
    #[error("expression nested too deeply at position {position}")]
    NestingTooDeep { position: usize },
}

/// runtime failure carried inside an error value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// operand could not be converted to a number
    #[error("{}", not_number_message(.name, .text))]
    NotNumber { name: Option<String>, text: String },

    /// operand is nil where a number is required
    #[error("{}", nil_value_message(.name))]
    NilValue { name: Option<String> },

    /// right-hand side of `=~` / `!~` is not a valid regular expression
    #[error("invalid regexp '{pattern}': {reason}")]
    InvalidRegexp { pattern: String, reason: String },

    /// `%` with a divisor that truncates to zero
    #[error("integer division by zero")]
    DivisionByZero,
}

fn not_number_message(name: &Option<String>, text: &str) -> String {
    match name {
        Some(name) => format!("variable '{}' is not a number: '{}'", name, text),
        None => format!("'{}' is not a number", text),
    }
}

fn nil_value_message(name: &Option<String>) -> String {
    match name {
        Some(name) => format!("variable '{}' is nil, can not convert to number", name),
        None => "can not convert nil value to number".to_string(),
    }
}

/// any failure of a compile-and-execute round trip
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("syntax error: {0}")]
    Tokenize(#[from] TokenizeError),

    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl ExprError {
    /// whether the failure happened before any data was looked at
    pub fn is_syntax(&self) -> bool {
        matches!(self, ExprError::Tokenize(_) | ExprError::Syntax(_))
    }
}
