//! End-to-end scenarios and whole-pipeline properties over a corpus of functions.
use crate::analysis::config::RootSettings;
use crate::analysis::domain::analyze_domain;
use crate::analysis::intersections::{RootMethod, find_intersections};
use crate::analysis::range::{RangeResult, estimate_range};
use crate::errors::{ParseError, PointFailure};
use crate::numerical::sampling::grid;
use crate::symbolic::parse_expr::normalize;
use crate::symbolic::symbolic_lambdify::compile;
use approx::assert_relative_eq;
use std::f64::consts::PI;

const CORPUS: [&str; 16] = [
    "x^2 - 4",
    "1/x",
    "sqrt(x)",
    "log(x - 1)",
    "sin(x)",
    "sqrt(4 - x^2)",
    "(x + 1)/(x^2 - 1)",
    "ln(x) + sqrt(x - 2)",
    "arcsin(2x)",
    "x^(-1/2)",
    "sqrt(x)/(x - 4)",
    "x^3 - 2x + 1",
    "exp(x) - 3",
    "|x| - 1",
    "x^x",
    "exp(-x^2)*sin(x)",
];

//___________________________________SCENARIOS____________________________________

#[test]
fn scenario_reciprocal() {
    let expr = normalize("1/x").unwrap();
    let domain = analyze_domain(&expr);
    assert!(!domain.domain.contains(0.0));
    assert!(domain.domain.contains(-1.0) && domain.domain.contains(1.0));
    let found = find_intersections(&expr);
    assert!(found.y0.is_nan());
    assert!(found.x_roots.is_empty());
    assert!(matches!(estimate_range(&expr), RangeResult::Unbounded { .. }));
}

#[test]
fn scenario_parabola() {
    let expr = normalize("x^2 - 4").unwrap();
    assert!(analyze_domain(&expr).domain.is_all());
    let found = find_intersections(&expr);
    assert_eq!(found.x_roots, vec![-2.0, 2.0]);
    assert_eq!(found.y0, -4.0);
}

#[test]
fn scenario_square_root() {
    let expr = normalize("sqrt(x)").unwrap();
    assert_eq!(analyze_domain(&expr).domain.to_string(), "[0, ∞)");
    let found = find_intersections(&expr);
    assert_eq!(found.y0, 0.0);
    assert_eq!(found.x_roots, vec![0.0]);
}

#[test]
fn scenario_logarithm() {
    let expr = normalize("log(x - 1)").unwrap();
    let domain = analyze_domain(&expr);
    assert!(!domain.domain.contains(1.0));
    assert!(!domain.domain.contains(0.5));
    assert!(domain.domain.contains(1.000001));
    assert!(domain.steps.iter().any(|s| s.contains("x - 1 > 0")));
    assert!(find_intersections(&expr).y0.is_nan());
}

#[test]
fn scenario_sine() {
    let expr = normalize("sin(x)").unwrap();
    let (min, max) = estimate_range(&expr).bounds().unwrap();
    assert_relative_eq!(min, -1.0, epsilon = 1e-2);
    assert_relative_eq!(max, 1.0, epsilon = 1e-2);
    let found = find_intersections(&expr);
    assert!(found.x_roots.len() >= 6);
    for root in &found.x_roots {
        let k = (root / PI).round();
        assert!((root - k * PI).abs() < 1e-5, "root {} is not a multiple of π", root);
    }
}

#[test]
fn scenario_equation_is_rejected() {
    assert_eq!(normalize("x = 2"), Err(ParseError::ContainsEquality));
}

//___________________________________PROPERTIES____________________________________

#[test]
fn printed_expressions_parse_back() {
    for text in CORPUS {
        let expr = normalize(text).unwrap();
        let again = normalize(&expr.to_string()).unwrap();
        assert_eq!(expr.tree(), again.tree(), "{}", text);
    }
}

#[test]
fn domain_exclusions_are_sound() {
    for text in CORPUS {
        let expr = normalize(text).unwrap();
        let domain = analyze_domain(&expr);
        if domain.unresolved().count() > 0 {
            continue;
        }
        let callable = compile(&expr).unwrap();
        for x in grid((-10.0, 10.0), 0.05) {
            if !domain.domain.contains(x) {
                continue;
            }
            match callable.evaluate(x) {
                Err(
                    failure @ (PointFailure::DivisionByZero
                    | PointFailure::NegativeEvenRoot
                    | PointFailure::NonPositiveLog
                    | PointFailure::OutOfInverseTrigRange),
                ) => panic!("{} fails at {} inside its domain: {}", text, x, failure),
                _ => {}
            }
        }
    }
}

#[test]
fn x_intercepts_are_roots_and_distinct() {
    let tolerance = RootSettings::default().tolerance;
    for text in CORPUS {
        let expr = normalize(text).unwrap();
        let callable = compile(&expr).unwrap();
        let found = find_intersections(&expr);
        let allowed = match found.method {
            // rounded to 5 decimals
            RootMethod::Exact => 1e-3,
            RootMethod::Numeric { .. } => 10.0 * tolerance,
        };
        for root in &found.x_roots {
            let value = callable.evaluate(*root).unwrap();
            assert!(value.abs() < allowed, "{}: f({}) = {}", text, root, value);
        }
        assert!(found.x_roots.len() <= 10);
        assert!(
            found
                .x_roots
                .windows(2)
                .all(|pair| pair[1] - pair[0] >= RootSettings::default().dedup_threshold),
            "{}: {:?}",
            text,
            found.x_roots
        );
    }
}

#[test]
fn y_intercept_is_the_value_at_zero() {
    for text in CORPUS {
        let expr = normalize(text).unwrap();
        let found = find_intersections(&expr);
        match compile(&expr).unwrap().evaluate(0.0) {
            Ok(value) => assert_eq!(found.y0, value, "{}", text),
            Err(_) => assert!(found.y0.is_nan(), "{}", text),
        }
    }
}

#[test]
fn analyses_are_idempotent() {
    for text in CORPUS {
        let expr = normalize(text).unwrap();
        assert_eq!(analyze_domain(&expr), analyze_domain(&expr));
        assert_eq!(estimate_range(&expr), estimate_range(&expr));
        let (first, second) = (find_intersections(&expr), find_intersections(&expr));
        assert_eq!(first.x_roots, second.x_roots);
        assert_eq!(first.y0.to_bits(), second.y0.to_bits());
    }
}
