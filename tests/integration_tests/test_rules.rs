// rule sets loaded from a config file

use filterexpr::config;
use filterexpr::rules::RuleError;
use filterexpr::MapResolver;
use serde_json::json;

use crate::common::create_config;

#[test]
fn test_rules_from_config_file() {
    let (_dir, path) = create_config(&json!({
        "rules": {
            "http_ok": "code >= 200 && code < 300",
            "slow": "rt > 1000",
            "edge": "host = '*.edge.example.com'"
        }
    }));

    let config = config::load(&path).unwrap();
    let rules = config::rule_set(&config).unwrap();
    assert_eq!(rules.len(), 3);

    let data = MapResolver::new()
        .with("code", 204)
        .with("rt", 1500)
        .with("host", "fra1.edge.example.com");
    assert_eq!(rules.matching(&data), vec!["edge", "http_ok", "slow"]);

    let data = MapResolver::new()
        .with("code", 500)
        .with("rt", 10)
        .with("host", "origin.example.com");
    assert!(rules.matching(&data).is_empty());
}

#[test]
fn test_broken_rule_is_named() {
    let (_dir, path) = create_config(&json!({
        "rules": { "ok": "a == 1", "broken": "a | 1" }
    }));

    let config = config::load(&path).unwrap();
    match config::rule_set(&config) {
        Err(RuleError::Compile { name, .. }) => assert_eq!(name, "broken"),
        other => panic!("expected compile error, got {:?}", other.map(|r| r.len())),
    }

    let errors = config::verify(&path).unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("rules.broken: "));
}

#[test]
fn test_outcomes_keep_errors_per_rule() {
    let (_dir, path) = create_config(&json!({
        "rules": { "needs_rt": "rt > 100", "needs_code": "code == 200" }
    }));

    let rules = config::rule_set(&config::load(&path).unwrap()).unwrap();
    let outcomes = rules.evaluate(&MapResolver::new().with("code", 200));

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].name, "needs_code");
    assert_eq!(outcomes[0].result, Ok(true));
    assert_eq!(outcomes[1].name, "needs_rt");
    assert!(outcomes[1].result.is_err());
}
