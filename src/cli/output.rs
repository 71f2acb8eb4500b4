//! how command results reach stdout
//!
//! text for people, JSON-RPC 2.0 envelopes for scripts. a result is wrapped as
//! `{"jsonrpc":"2.0","result":...,"id":null}` and a failure as
//! `{"jsonrpc":"2.0","error":{"code":-32000-exit,"message":...,"data":...},"id":null}`.

use serde::Serialize;
use std::io::IsTerminal;

use crate::expr::Token;
use crate::rules::RuleOutcomeData;

const JSONRPC_VERSION: &str = "2.0";

/// first error code of the JSON-RPC application range
const JSONRPC_APP_BASE: i32 = -32000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
    /// print nothing; the exit code is the answer
    Quiet,
}

impl OutputMode {
    /// `--quiet` beats `--json`, which beats `--no-json`; with none of them,
    /// JSON is used whenever stdout is piped
    pub fn from_flags(json: bool, no_json: bool, quiet: bool) -> Self {
        match (quiet, json, no_json) {
            (true, _, _) => OutputMode::Quiet,
            (false, true, _) => OutputMode::Json,
            (false, false, true) => OutputMode::Text,
            (false, false, false) if std::io::stdout().is_terminal() => OutputMode::Text,
            _ => OutputMode::Json,
        }
    }

    pub fn is_json(&self) -> bool {
        *self == OutputMode::Json
    }
}

/// success envelope
#[derive(Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub result: T,
    /// always null, a CLI run has no request id
    pub id: Option<String>,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(result: T) -> Self {
        JsonRpcResponse {
            jsonrpc: JSONRPC_VERSION,
            result,
            id: None,
        }
    }
}

/// failure envelope
#[derive(Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: &'static str,
    pub error: RpcError,
    pub id: Option<String>,
}

#[derive(Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorData>,
}

/// did-you-mean names and per-item messages (e.g. one per broken rule)
#[derive(Serialize)]
pub struct ErrorData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl JsonRpcError {
    pub fn new(exit_code: i32, message: impl Into<String>) -> Self {
        Self::with_data(exit_code, message, Vec::new(), Vec::new())
    }

    /// empty lists are left out of the envelope
    pub fn with_data(
        exit_code: i32,
        message: impl Into<String>,
        suggestions: Vec<String>,
        details: Vec<String>,
    ) -> Self {
        let non_empty = |v: Vec<String>| (!v.is_empty()).then_some(v);
        let data = match (non_empty(suggestions), non_empty(details)) {
            (None, None) => None,
            (suggestions, details) => Some(ErrorData {
                suggestions,
                details,
            }),
        };

        JsonRpcError {
            jsonrpc: JSONRPC_VERSION,
            error: RpcError {
                code: to_jsonrpc_code(exit_code),
                message: message.into(),
                data,
            },
            id: None,
        }
    }
}

fn to_jsonrpc_code(exit_code: i32) -> i32 {
    JSONRPC_APP_BASE - exit_code
}

// ============================================================================
// Result data structures for different commands
// ============================================================================

/// result data for `eval`
#[derive(Serialize)]
pub struct EvalData {
    pub expression: String,
    pub verdict: bool,
    /// text form of the root value
    pub value: String,
}

/// one token for `tokens`
#[derive(Serialize)]
pub struct TokenData {
    pub kind: &'static str,
    pub raw: String,
}

impl From<&Token> for TokenData {
    fn from(token: &Token) -> Self {
        Self {
            kind: token.kind.name(),
            raw: token.raw.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct TokensData {
    pub expression: String,
    pub tokens: Vec<TokenData>,
}

/// result data for `equal`
#[derive(Serialize)]
pub struct EqualData {
    pub left: String,
    pub right: String,
    pub equal: bool,
}

/// result data for `check`
#[derive(Serialize)]
pub struct CheckData {
    pub passed: bool,
    pub rules: Vec<RuleOutcomeData>,
}

#[derive(Serialize)]
pub struct PathData {
    pub path: String,
}

/// result data for `config verify`
#[derive(Serialize)]
pub struct VerifyData {
    pub path: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

/// result data for `config set-rule` / `config remove-rule`
#[derive(Serialize)]
pub struct RuleChangeData {
    pub action: &'static str,
    pub name: String,
    pub expression: String,
}

// ============================================================================
// Printing
// ============================================================================

fn emit<T: Serialize>(envelope: &T) {
    if let Ok(line) = serde_json::to_string(envelope) {
        println!("{}", line);
    }
}

pub fn print_json<T: Serialize>(data: &T) {
    emit(&JsonRpcResponse::new(data));
}

pub fn print_json_error(exit_code: i32, message: &str) {
    emit(&JsonRpcError::new(exit_code, message));
}

pub fn print_json_error_with_data(
    exit_code: i32,
    message: &str,
    suggestions: Vec<String>,
    details: Vec<String>,
) {
    emit(&JsonRpcError::with_data(
        exit_code,
        message,
        suggestions,
        details,
    ));
}
