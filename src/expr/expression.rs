//! compiled expressions
//!
//! an [`Expression`] holds nothing but its token stream, so it can be cloned
//! cheaply and executed from any number of threads at once.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::error::{ExprError, SyntaxError, TokenizeError};
use super::eval;
use super::lexer::tokenize;
use super::resolver::{DynamicValue, MapResolver, Resolver};
use super::token::Token;
use super::value::Value;

const LOG_TARGET: &str = "filterexpr::expression";

/// a tokenized expression, ready to execute
#[derive(Debug, Clone)]
pub struct Expression {
    source: String,
    tokens: Arc<[Token]>,
}

impl Expression {
    /// tokenize `source` (after trimming)
    ///
    /// only tokenization happens here; grammar errors surface on execution.
    pub fn compile(source: &str) -> Result<Self, TokenizeError> {
        let source = source.trim();
        let tokens = tokenize(source).map_err(|e| {
            log::debug!(target: LOG_TARGET, "failed to compile '{}': {}", source, e);
            e
        })?;
        log::debug!(
            target: LOG_TARGET,
            "compiled '{}' into {} tokens",
            source,
            tokens.len()
        );
        Ok(Self {
            source: source.to_string(),
            tokens: tokens.into(),
        })
    }

    /// the trimmed source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// the token stream, always ending with an end token
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// the raw root value; error values are returned as values, not errors
    pub fn evaluate<R: Resolver + ?Sized>(&self, resolver: &R) -> Result<Value, SyntaxError> {
        eval::evaluate(&self.tokens, resolver)
    }

    /// run the expression and reduce the root value to a verdict
    pub fn execute<R: Resolver + ?Sized>(&self, resolver: &R) -> Result<bool, ExprError> {
        let value = self.evaluate(resolver)?;
        if let Some(e) = value.error_ref() {
            return Err(e.clone().into());
        }
        Ok(value.as_boolean())
    }

    /// [`Expression::execute`] as a verdict plus optional error; on error the
    /// verdict is `false`
    pub fn verdict<R: Resolver + ?Sized>(&self, resolver: &R) -> (bool, Option<ExprError>) {
        match self.execute(resolver) {
            Ok(verdict) => (verdict, None),
            Err(e) => (false, Some(e)),
        }
    }
}

impl FromStr for Expression {
    type Err = TokenizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expression::compile(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// two expressions are structurally equal when they tokenize to the same
/// token sequence; text that fails to tokenize equals nothing
pub fn structurally_equal(a: &str, b: &str) -> bool {
    match (tokenize(a.trim()), tokenize(b.trim())) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// compile and execute in one step
pub fn execute<R: Resolver + ?Sized>(source: &str, resolver: &R) -> Result<bool, ExprError> {
    Expression::compile(source)?.execute(resolver)
}

/// compile and execute against name/value pairs
pub fn execute_map<I, K, V>(source: &str, pairs: I) -> Result<bool, ExprError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<DynamicValue>,
{
    let expression = Expression::compile(source)?;
    let resolver: MapResolver = pairs.into_iter().collect();
    expression.execute(&resolver)
}
