//! boolean filter expressions
//!
//! short rules such as `code >= 200 && code < 300 && error == ''` are
//! compiled once into a token stream and executed against caller data:
//! - logical operators: `&&`, `||`, `!`
//! - comparisons: `==`, `!=`, `<`, `<=`, `>`, `>=`
//! - matching: `=~` / `!~` (regular expressions), `=` (`*` wildcards)
//! - arithmetic: `+`, `-`, `*`, `/`, `%`
//!
//! variables are looked up through a [`Resolver`] while the expression runs.
//! a failed coercion does not abort evaluation; it becomes an error value that
//! `&&` and `||` may discard, and only an error at the root fails the run.

mod error;
mod eval;
mod expression;
mod lexer;
mod resolver;
mod token;
mod value;
mod wildcard;

pub use error::{EvalError, ExprError, SyntaxError, TokenizeError};
pub use expression::{execute, execute_map, structurally_equal, Expression};
pub use lexer::tokenize;
pub use resolver::{DynamicValue, FnResolver, MapResolver, Resolver};
pub use token::{Token, TokenKind};
pub use value::{Value, ValueKind};
pub use wildcard::wildcard_match;
