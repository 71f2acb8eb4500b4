//! dynamically-typed values and the operators that combine them
//!
//! every operator is total: a failure becomes an [`ValueKind::Error`] value that
//! flows through the rest of the evaluation instead of aborting it.

use std::borrow::Cow;
use std::fmt;
use std::ops;

use regex::Regex;

use super::error::EvalError;
use super::wildcard::wildcard_match;

/// the five tags a value can carry
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
    Error(EvalError),
}

/// a value plus the variable it was read from, if any
///
/// the name only feeds diagnostics; two values are equal when their kinds are.
#[derive(Debug, Clone)]
pub struct Value {
    kind: ValueKind,
    name: Option<String>,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Value {
    pub fn new(kind: ValueKind) -> Self {
        Self { kind, name: None }
    }

    pub fn nil() -> Self {
        Self::new(ValueKind::Nil)
    }

    pub fn boolean(b: bool) -> Self {
        Self::new(ValueKind::Boolean(b))
    }

    pub fn number(n: f64) -> Self {
        Self::new(ValueKind::Number(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::new(ValueKind::String(s.into()))
    }

    pub fn error(e: EvalError) -> Self {
        Self::new(ValueKind::Error(e))
    }

    /// attach the variable name this value was resolved from
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_nil(&self) -> bool {
        matches!(self.kind, ValueKind::Nil)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, ValueKind::Error(_))
    }

    /// the carried error, if this is an error value
    pub fn error_ref(&self) -> Option<&EvalError> {
        match &self.kind {
            ValueKind::Error(e) => Some(e),
            _ => None,
        }
    }

    /// consume the value, returning the carried error if any
    pub fn into_error(self) -> Option<EvalError> {
        match self.kind {
            ValueKind::Error(e) => Some(e),
            _ => None,
        }
    }

    // ========================================================================
    // Coercions
    // ========================================================================

    pub fn as_number(&self) -> Result<f64, EvalError> {
        match &self.kind {
            ValueKind::Number(n) => Ok(*n),
            ValueKind::String(s) => s.parse::<f64>().map_err(|_| EvalError::NotNumber {
                name: self.name.clone(),
                text: s.clone(),
            }),
            ValueKind::Nil => Err(EvalError::NilValue {
                name: self.name.clone(),
            }),
            ValueKind::Boolean(b) => Err(EvalError::NotNumber {
                name: self.name.clone(),
                text: b.to_string(),
            }),
            ValueKind::Error(e) => Err(e.clone()),
        }
    }

    /// canonical text form; equality and matching operators compare this
    pub fn as_string(&self) -> Cow<'_, str> {
        match &self.kind {
            ValueKind::String(s) => Cow::Borrowed(s.as_str()),
            ValueKind::Number(n) => Cow::Owned(n.to_string()),
            ValueKind::Boolean(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            ValueKind::Nil => Cow::Borrowed("<nil>"),
            ValueKind::Error(e) => Cow::Owned(e.to_string()),
        }
    }

    /// truthiness: errors and nil are false, `""` and `"false"` are false,
    /// everything else (including `"0"`) is true
    pub fn as_boolean(&self) -> bool {
        match &self.kind {
            ValueKind::Boolean(b) => *b,
            ValueKind::Error(_) | ValueKind::Nil => false,
            _ => {
                let text = self.as_string().to_lowercase();
                !text.is_empty() && text != "false"
            }
        }
    }

    // ========================================================================
    // Logical operators
    // ========================================================================

    /// `a && b`; both sides are already evaluated, so an error in `b` is
    /// dropped whenever `a` decides the result
    pub fn and(self, rhs: Value) -> Value {
        if self.is_error() || !self.as_boolean() {
            return self;
        }
        rhs
    }

    /// `a || b`
    pub fn or(self, rhs: Value) -> Value {
        if self.is_error() || self.as_boolean() {
            return self;
        }
        rhs
    }

    // ========================================================================
    // Comparison operators
    // ========================================================================

    /// `a == b`, always by text form so `123 == "123"` holds
    pub fn equals(&self, rhs: &Value) -> Value {
        Value::boolean(self.as_string() == rhs.as_string())
    }

    /// `a != b`
    pub fn not_equals(&self, rhs: &Value) -> Value {
        !self.equals(rhs)
    }

    /// `a =~ b`, `b` compiled as a regular expression on every call
    pub fn regex_match(&self, rhs: &Value) -> Value {
        let pattern = rhs.as_string();
        match Regex::new(&pattern) {
            Ok(re) => Value::boolean(re.is_match(&self.as_string())),
            Err(e) => Value::error(EvalError::InvalidRegexp {
                pattern: pattern.into_owned(),
                reason: e.to_string(),
            }),
        }
    }

    /// `a !~ b`
    pub fn regex_not_match(&self, rhs: &Value) -> Value {
        !self.regex_match(rhs)
    }

    /// `a = b`, where `b` is a `*` wildcard pattern
    pub fn wildcard(&self, rhs: &Value) -> Value {
        Value::boolean(wildcard_match(&rhs.as_string(), &self.as_string()))
    }

    pub fn greater_than(&self, rhs: &Value) -> Value {
        self.numeric(rhs, |a, b| Value::boolean(a > b))
    }

    pub fn greater_or_equal(&self, rhs: &Value) -> Value {
        self.numeric(rhs, |a, b| Value::boolean(a >= b))
    }

    pub fn less_than(&self, rhs: &Value) -> Value {
        self.numeric(rhs, |a, b| Value::boolean(a < b))
    }

    pub fn less_or_equal(&self, rhs: &Value) -> Value {
        self.numeric(rhs, |a, b| Value::boolean(a <= b))
    }

    /// coerce both sides to numbers, left first, and combine them;
    /// the first side that fails to coerce becomes the result
    fn numeric(&self, rhs: &Value, f: impl FnOnce(f64, f64) -> Value) -> Value {
        let left = match self.as_number() {
            Ok(n) => n,
            Err(e) => return Value::error(e),
        };
        let right = match rhs.as_number() {
            Ok(n) => n,
            Err(e) => return Value::error(e),
        };
        f(left, right)
    }
}

// ============================================================================
// Arithmetic operators
// ============================================================================

impl ops::Not for Value {
    type Output = Value;

    /// errors pass through unchanged instead of turning into `true`
    fn not(self) -> Value {
        if self.is_error() {
            return self;
        }
        Value::boolean(!self.as_boolean())
    }
}

impl ops::Add for Value {
    type Output = Value;

    /// numeric addition, or string concatenation when either side is not a number
    fn add(self, rhs: Value) -> Value {
        match (self.as_number(), rhs.as_number()) {
            (Ok(a), Ok(b)) => Value::number(a + b),
            _ => Value::string(format!("{}{}", self.as_string(), rhs.as_string())),
        }
    }
}

impl ops::Sub for Value {
    type Output = Value;

    fn sub(self, rhs: Value) -> Value {
        self.numeric(&rhs, |a, b| Value::number(a - b))
    }
}

impl ops::Mul for Value {
    type Output = Value;

    fn mul(self, rhs: Value) -> Value {
        self.numeric(&rhs, |a, b| Value::number(a * b))
    }
}

impl ops::Div for Value {
    type Output = Value;

    fn div(self, rhs: Value) -> Value {
        self.numeric(&rhs, |a, b| Value::number(a / b))
    }
}

impl ops::Rem for Value {
    type Output = Value;

    /// both operands are truncated to integers first
    fn rem(self, rhs: Value) -> Value {
        self.numeric(&rhs, |a, b| {
            let (a, b) = (a as i64, b as i64);
            if b == 0 {
                Value::error(EvalError::DivisionByZero)
            } else {
                Value::number(a.wrapping_rem(b) as f64)
            }
        })
    }
}

impl ops::Neg for Value {
    type Output = Value;

    fn neg(self) -> Value {
        Value::number(0.0) - self
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<EvalError> for Value {
    fn from(e: EvalError) -> Self {
        Value::error(e)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}
