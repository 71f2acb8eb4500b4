// integration tests for shell completion generation

use crate::common::*;

#[test]
fn test_completions_for_each_shell() {
    for shell in ["bash", "zsh", "fish"] {
        let output = run(&["completions", shell]);
        assert_eq!(output.status.code(), Some(0), "{}", shell);
        assert!(stdout(&output).contains("filterexpr"), "{}", shell);
    }
}

#[test]
fn test_completions_unknown_shell() {
    let output = run(&["completions", "tcsh"]);
    assert_ne!(output.status.code(), Some(0));
}
