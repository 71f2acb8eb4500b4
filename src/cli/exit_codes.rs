//! process exit codes
//!
//! a false verdict gets its own code so scripts can tell "the rule did not
//! match" apart from "the rule could not run".

/// done, or the expression was true
pub const SUCCESS: i32 = 0;

/// anything without a more specific code
pub const ERROR: i32 = 1;

/// the expression was false
pub const VERDICT_FALSE: i32 = 2;

/// tokenize or grammar error
pub const SYNTAX_ERROR: i32 = 3;

/// bad flags, `--var` or `--data`
pub const INVALID_ARGS: i32 = 4;

/// config file missing, unreadable or holding broken rules
pub const CONFIG_ERROR: i32 = 5;

/// the expression ran but produced an error value
pub const EVAL_ERROR: i32 = 6;
