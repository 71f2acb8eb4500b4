// one compiled expression shared by many threads

use std::sync::Arc;
use std::thread;

use filterexpr::{ExprError, Expression, MapResolver};

const THREADS: usize = 20;
const ROUNDS: usize = 200;

fn input(i: usize) -> MapResolver {
    let data = MapResolver::new()
        .with("code", 200 + (i % 5) * 100)
        .with("rt", (i * 37) % 2000)
        .with("host", format!("10.0.{}.50", i % 3));
    // every seventh input is missing `code`, making the rule fail
    if i % 7 == 0 {
        data.with("code", None::<i64>)
    } else {
        data
    }
}

fn results(expr: &Expression, offset: usize) -> Vec<Result<bool, ExprError>> {
    (0..ROUNDS)
        .map(|i| expr.execute(&input(offset + i)))
        .collect()
}

#[test]
fn test_parallel_execution_matches_sequential() {
    let expr = Expression::compile(
        "code >= 200 && code < 400 && rt < 1500 && (host = '10.0.1.*' || host = '*.2.50')",
    )
    .unwrap();

    let expected: Vec<_> = (0..THREADS).map(|t| results(&expr, t * ROUNDS)).collect();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let expr = &expr;
                scope.spawn(move || results(expr, t * ROUNDS))
            })
            .collect();

        for (t, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), expected[t], "thread {}", t);
        }
    });
}

#[test]
fn test_clones_share_tokens_across_threads() {
    let expr = Arc::new(Expression::compile("value > 100").unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let expr = Arc::clone(&expr);
            thread::spawn(move || {
                let value = t * 10;
                let verdict = expr
                    .execute(&MapResolver::new().with("value", value))
                    .unwrap();
                (value, verdict)
            })
        })
        .collect();

    for handle in handles {
        let (value, verdict) = handle.join().unwrap();
        assert_eq!(verdict, value > 100);
    }
}
