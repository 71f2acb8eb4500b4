// end-to-end tests for compiling and executing expressions

use std::sync::atomic::{AtomicUsize, Ordering};

use filterexpr::expr::FnResolver;
use filterexpr::{
    execute, execute_map, structurally_equal, DynamicValue, EvalError, ExprError, Expression,
    MapResolver, SyntaxError,
};
use serde_json::json;

fn run(source: &str, data: &MapResolver) -> Result<bool, ExprError> {
    Expression::compile(source)
        .expect("expression should compile")
        .execute(data)
}

// ============================================================================
// monitoring rules
// ============================================================================

#[test]
fn test_url_monitor_rule() {
    let data = MapResolver::new()
        .with("class", "URL monitor")
        .with("value", 234);
    assert_eq!(
        run(r#"class == "URL monitor" && value >= 1"#, &data),
        Ok(true)
    );
}

#[test]
fn test_http_check_rule() {
    let data = MapResolver::new()
        .with("code", 200)
        .with("rt", 500)
        .with("error", "");
    assert_eq!(
        run("code >= 200 && code < 300 && rt < 10000 && error == ''", &data),
        Ok(true)
    );

    let data = MapResolver::new()
        .with("code", 200)
        .with("rt", 500)
        .with("error", "timeout");
    assert_eq!(
        run("code >= 200 && code < 300 && rt < 10000 && error == ''", &data),
        Ok(false)
    );
}

#[test]
fn test_negative_range() {
    let expr = Expression::compile("bizType >= -10 && bizType <= -1").unwrap();
    assert_eq!(expr.execute(&MapResolver::new().with("bizType", 4)), Ok(false));
    assert_eq!(expr.execute(&MapResolver::new().with("bizType", -5)), Ok(true));
}

#[test]
fn test_float_threshold() {
    let expr = Expression::compile("usage < 80").unwrap();
    assert_eq!(expr.execute(&MapResolver::new().with("usage", 65.5)), Ok(true));
    assert_eq!(expr.execute(&MapResolver::new().with("usage", 80.0f32)), Ok(false));
}

#[test]
fn test_range_with_nil_fallback() {
    let expr = Expression::compile("rx_mbps < 500 || rx_mbps > 20000 || rx_mbps == nil").unwrap();
    assert_eq!(expr.execute(&MapResolver::new().with("rx_mbps", 4000)), Ok(false));
    assert_eq!(expr.execute(&MapResolver::new().with("rx_mbps", 100)), Ok(true));
}

// ============================================================================
// matching operators
// ============================================================================

#[test]
fn test_wildcard_suffix() {
    let expr = Expression::compile("host = '*.50.50'").unwrap();
    for host in ["10.1.50.50", ".50.50", "abc.50.50"] {
        assert_eq!(
            expr.execute(&MapResolver::new().with("host", host)),
            Ok(true),
            "{}",
            host
        );
    }
    for host in ["10.150.50", "50.50", "abc50.50", "abc.50.50.10"] {
        assert_eq!(
            expr.execute(&MapResolver::new().with("host", host)),
            Ok(false),
            "{}",
            host
        );
    }
}

#[test]
fn test_wildcard_contains() {
    let expr = Expression::compile(r#"host = "*50.50*""#).unwrap();
    for host in ["10.150.50", "50.50", "abc50.50", "abc.50.50.10"] {
        assert_eq!(
            expr.execute(&MapResolver::new().with("host", host)),
            Ok(true),
            "{}",
            host
        );
    }
}

#[test]
fn test_regex_operators() {
    let matches = Expression::compile(r#"s =~ "200""#).unwrap();
    let not_matches = Expression::compile(r#"s !~ "200""#).unwrap();

    assert_eq!(matches.execute(&MapResolver::new().with("s", "OK 200")), Ok(true));
    assert_eq!(matches.execute(&MapResolver::new().with("s", "OK 300")), Ok(false));
    assert_eq!(
        not_matches.execute(&MapResolver::new().with("s", "OK 200")),
        Ok(false)
    );
}

// ============================================================================
// one compiled expression, many inputs
// ============================================================================

#[test]
fn test_one_handle_many_inputs() {
    let expr = Expression::compile("value > 200").unwrap();

    assert_eq!(expr.execute(&MapResolver::new().with("value", 1000)), Ok(true));
    assert_eq!(expr.execute(&MapResolver::new().with("value", 100)), Ok(false));
    assert_eq!(
        expr.execute(&MapResolver::new().with("value", DynamicValue::Nil)),
        Err(ExprError::Eval(EvalError::NilValue {
            name: Some("value".to_string())
        }))
    );
    assert_eq!(
        expr.execute(&MapResolver::new().with("value", "gogogo")),
        Err(ExprError::Eval(EvalError::NotNumber {
            name: Some("value".to_string()),
            text: "gogogo".to_string(),
        }))
    );

    let bad_regex = Expression::compile(r#"value =~ "wskl).]""#).unwrap();
    assert!(matches!(
        bad_regex.execute(&MapResolver::new().with("value", 1000)),
        Err(ExprError::Eval(EvalError::InvalidRegexp { .. }))
    ));
}

// ============================================================================
// nil handling
// ============================================================================

#[test]
fn test_nil_checks_guard_comparisons() {
    let empty = MapResolver::new();
    let explicit_nil = MapResolver::new().with("value", DynamicValue::Nil);

    for data in [&empty, &explicit_nil] {
        assert_eq!(run("value == nil || value > 1000", data), Ok(true));
        assert_eq!(run("value != nil && value > 1000", data), Ok(false));
    }
}

#[test]
fn test_nil_comparison_order_matters() {
    let empty = MapResolver::new();
    assert_eq!(
        run("value > 1000 || value == nil", &empty),
        Err(ExprError::Eval(EvalError::NilValue {
            name: Some("value".to_string())
        }))
    );
}

#[test]
fn test_nil_is_not_empty_string() {
    assert_eq!(run(r#"value == """#, &MapResolver::new()), Ok(false));
}

#[test]
fn test_negated_error_stays_an_error() {
    let expr = Expression::compile("!(value > 0)").unwrap();
    let (verdict, err) = expr.verdict(&MapResolver::new());
    assert!(!verdict);
    assert!(matches!(err, Some(ExprError::Eval(EvalError::NilValue { .. }))));
}

#[test]
fn test_literal_equalities_without_data() {
    for source in ["nil == nil", "123 == 123", r#""123" == "123""#, "abc == nil", "123 == '123'"] {
        assert_eq!(run(source, &MapResolver::new()), Ok(true), "{}", source);
    }
}

// ============================================================================
// evaluation order
// ============================================================================

#[test]
fn test_decided_branch_hides_error() {
    let data = MapResolver::new().with("a", 0);
    // the right side fails (b is nil) but the left side already decided
    assert_eq!(run("a > 1 && b > 1", &data), Ok(false));

    let data = MapResolver::new().with("a", 5);
    assert_eq!(run("a > 1 || b > 1", &data), Ok(true));
}

#[test]
fn test_every_identifier_is_resolved_once() {
    let calls = AtomicUsize::new(0);
    let resolver = FnResolver(|name: &str| {
        calls.fetch_add(1, Ordering::SeqCst);
        (name == "a").then(|| DynamicValue::from(1))
    });

    let expr = Expression::compile("a == 1 || a == 2 || b").unwrap();
    assert_eq!(expr.execute(&resolver), Ok(true));
    // no short-circuit: the right operands still ran
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_not_binds_looser_than_comparison() {
    let data = MapResolver::new().with("a", 1).with("b", 2);
    assert_eq!(run("!a == b", &data), Ok(true));
    assert_eq!(run("!(a == b) && a < b", &data), Ok(true));
}

#[test]
fn test_arithmetic_in_conditions() {
    let data = MapResolver::new()
        .with("sent", 120)
        .with("lost", 30)
        .with("count", 7)
        .with("name", "foo");
    assert_eq!(run("lost / sent * 100 > 20", &data), Ok(true));
    assert_eq!(run("(sent - lost) * 2 == 180", &data), Ok(true));
    assert_eq!(run("count % 3 == 1", &data), Ok(true));
    assert_eq!(run("-count < 0", &data), Ok(true));
    assert_eq!(run("name + 1 == 'foo1'", &data), Ok(true));
}

// ============================================================================
// errors
// ============================================================================

#[test]
fn test_syntax_errors_surface_at_execution() {
    let expr = Expression::compile("(code == 200").unwrap();
    let err = expr.execute(&MapResolver::new()).unwrap_err();
    assert!(err.is_syntax());

    let expr = Expression::compile("code == 200 404").unwrap();
    assert!(expr.execute(&MapResolver::new()).unwrap_err().is_syntax());
}

#[test]
fn test_deeply_nested_input_fails_cleanly() {
    let deep_not = Expression::compile(&format!("{}true", "!".repeat(3_000))).unwrap();
    assert!(matches!(
        deep_not.execute(&MapResolver::new()),
        Err(ExprError::Syntax(SyntaxError::NestingTooDeep { .. }))
    ));

    let source = format!("{}1{} == 1", "(".repeat(50_000), ")".repeat(50_000));
    let deep_parens = Expression::compile(&source).unwrap();
    let (verdict, err) = deep_parens.verdict(&MapResolver::new());
    assert!(!verdict);
    assert!(err.is_some_and(|e| e.is_syntax()));
}

#[test]
fn test_tokenize_errors_fail_compilation() {
    for source in ["a | b", "a & b", "a == #", "a == 'open", "a >~ b"] {
        assert!(Expression::compile(source).is_err(), "{}", source);
    }
}

// ============================================================================
// resolvers and helpers
// ============================================================================

#[test]
fn test_json_value_as_resolver() {
    let data = json!({
        "code": 200,
        "error": "",
        "tags": ["a", "b"],
        "ok": true
    });
    let expr = Expression::compile("code == 200 && error == '' && ok && tags =~ 'a'").unwrap();
    assert_eq!(expr.execute(&data), Ok(true));
}

#[test]
fn test_one_shot_execute() {
    let data = MapResolver::new().with("code", 503);
    assert_eq!(execute("code >= 500", &data), Ok(true));
    assert!(matches!(
        execute("code # 500", &data),
        Err(ExprError::Tokenize(_))
    ));

    assert_eq!(
        execute_map("code == 200 && host = '*.example.com'", [
            ("code", DynamicValue::from(200)),
            ("host", DynamicValue::from("api.example.com")),
        ]),
        Ok(true)
    );
}

#[test]
fn test_structural_equality() {
    assert!(structurally_equal("", ""));
    assert!(structurally_equal("a==2", "a == 2"));
    assert!(!structurally_equal("a=2", "a==2"));
    assert!(!structurally_equal("a == 'x", "a == 'x"));
}
