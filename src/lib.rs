// library crate for filterexpr
// the expression engine plus the modules the binaries share (e.g., generate-man)

pub mod cli;
pub mod config;
pub mod expr;
pub mod rules;

pub use expr::{
    execute, execute_map, structurally_equal, DynamicValue, EvalError, ExprError, Expression,
    MapResolver, Resolver, SyntaxError, TokenizeError, Value,
};
