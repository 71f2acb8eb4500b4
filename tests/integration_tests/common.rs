// shared utilities for integration tests

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const CONFIG_ENV_VAR: &str = "FILTEREXPR_CONFIG";

/// a config path that never exists, so runs never see the real home config
pub const MISSING_CONFIG: &str = "/nonexistent/filterexpr/config.json";

/// path to the built filterexpr binary
pub fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_filterexpr"))
}

/// run filterexpr and capture output
///
/// FILTEREXPR_CONFIG points at a path that does not exist, so tests never
/// touch the real config in the home directory.
pub fn run(args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .env(CONFIG_ENV_VAR, MISSING_CONFIG)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run filterexpr")
}

/// run filterexpr with `input` on stdin
#[allow(dead_code)]
pub fn run_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(binary_path())
        .args(args)
        .env(CONFIG_ENV_VAR, MISSING_CONFIG)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn filterexpr");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");

    child.wait_with_output().expect("Failed to wait for filterexpr")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// parse the single JSON-RPC line printed on stdout
pub fn json(output: &Output) -> serde_json::Value {
    serde_json::from_str(stdout(output).trim()).expect("stdout is not valid JSON")
}

/// write a config file with the given content into a fresh temp dir
#[allow(dead_code)]
pub fn create_config(content: &serde_json::Value) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    fs::write(&path, serde_json::to_string_pretty(content).unwrap())
        .expect("Failed to write test config");
    (dir, path)
}

#[allow(dead_code)]
pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path is valid UTF-8")
}
