// integration tests for man page generation

use std::fs;
use std::process::Command;

use tempfile::TempDir;

/// run generate-man into a fresh directory, returning it
fn generate() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = Command::new(env!("CARGO_BIN_EXE_generate-man"))
        .arg(dir.path())
        .output()
        .expect("Failed to run generate-man");
    assert!(
        output.status.success(),
        "generate-man failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    dir
}

#[test]
fn test_root_page_lists_commands() {
    let dir = generate();
    let page = fs::read_to_string(dir.path().join("filterexpr.1")).unwrap();

    assert!(page.contains(".TH filterexpr"));
    for command in ["eval", "tokens", "equal", "check", "config", "completions"] {
        assert!(page.contains(command), "missing {}", command);
    }
}

#[test]
fn test_one_page_per_subcommand() {
    let dir = generate();
    for command in ["eval", "tokens", "equal", "check", "config", "completions"] {
        let path = dir.path().join(format!("filterexpr-{}.1", command));
        assert!(path.exists(), "missing {}", path.display());
    }

    let eval = fs::read_to_string(dir.path().join("filterexpr-eval.1")).unwrap();
    assert!(eval.contains("NAME=VALUE"));
}
