// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]

use crate::analysis::config::{AnalysisConfig, RangeSettings};
use crate::analysis::domain::analyze_domain;
use crate::analysis::intersections::find_intersections;
use crate::analysis::point_eval::evaluate_at;
use crate::analysis::range::{RangeStrategy, estimate_range};
use crate::analysis::report::{analyze, analyze_parallel};
use crate::numerical::bisection::{ScalarRootFinder, bisection};
use crate::numerical::sampling::sample;
use crate::symbolic::parse_expr::normalize;
use crate::symbolic::symbolic_lambdify::compile;
use strum::IntoEnumIterator;

/// Functions used by the worked examples and the benchmarks.
pub const EXAMPLE_FUNCTIONS: [&str; 8] = [
    "x^2 - 4",
    "1/x",
    "sqrt(x)",
    "log(x - 1)",
    "sin(x)",
    "x/(x^2 + 1)",
    "tan(x)",
    "x*sin(x) + x^2",
];

#[allow(dead_code)]
pub fn analysis_examples(example: usize) {
    match example {
        0 => {
            // FULL REPORT
            // parse, analyze and print everything about one function
            for input in EXAMPLE_FUNCTIONS {
                match analyze(input, &AnalysisConfig::default()) {
                    Ok(report) => {
                        println!("{}", report);
                        println!("{}", report.intercepts_table());
                    }
                    Err(err) => println!("{}: {}", input, err),
                }
            }
        }
        1 => {
            // DOMAIN WITH JUSTIFICATION
            let input = "sqrt(x)/(x - 4) + ln(x + 1)";
            let expr = match normalize(input) {
                Ok(expr) => expr,
                Err(err) => return println!("{}: {}", input, err),
            };
            let domain = analyze_domain(&expr);
            println!("domain of {} = {}", input, domain.domain);
            for step in &domain.steps {
                println!("  {}", step);
            }
            // constraints the solver could not resolve are listed but not enforced
            for constraint in domain.unresolved() {
                println!("  unresolved {} constraint on {}", constraint.kind, constraint.source);
            }
        }
        2 => {
            // RANGE, STRATEGY BY STRATEGY
            let settings = RangeSettings::default();
            for input in ["x^2 - 4", "1/x", "x/(x^2 + 1)"] {
                let Ok(expr) = normalize(input) else { continue };
                for strategy in RangeStrategy::iter() {
                    match strategy.attempt(&expr, &settings) {
                        Ok(range) => println!("{}: {} gives {}", input, strategy, range),
                        Err(reason) => println!("{}: {} inconclusive ({})", input, strategy, reason),
                    }
                }
                println!("{}: range = {}", input, estimate_range(&expr));
            }
        }
        3 => {
            // AXIS INTERSECTIONS
            for input in ["x^2 - 2", "sin(x)", "cos(x) - x", "exp(x) + 1"] {
                let Ok(expr) = normalize(input) else { continue };
                let found = find_intersections(&expr);
                println!(
                    "{}: x-intercepts {:?}, y-intercept {}, by {}",
                    input, found.x_roots, found.y0, found.method
                );
            }
        }
        4 => {
            // VALUE AT A POINT WITH DERIVATION
            let Ok(expr) = normalize("(x^2 - 1)/(x + 2)") else { return };
            for point in [3.0, -2.0] {
                let evaluation = evaluate_at(&expr, point);
                for line in &evaluation.trace {
                    println!("{}", line);
                }
            }
        }
        5 => {
            // SAMPLES AND THE VALUE TABLE
            let Ok(expr) = normalize("1/(x - 1)") else { return };
            let Ok(callable) = compile(&expr) else { return };
            let samples = sample(&callable, (0.0, 2.0), 0.25);
            println!("samples {:?}", samples);
            if let Ok(report) = analyze("1/(x - 1)", &AnalysisConfig::default()) {
                println!("{}", report.values_table());
            }
        }
        6 => {
            // BISECTION ON A COMPILED FUNCTION AND ON A CLOSURE
            let Ok(expr) = normalize("x^3 - x - 2") else { return };
            let Ok(callable) = compile(&expr) else { return };
            let mut finder = ScalarRootFinder::new();
            finder.set_tolerance(1e-10);
            finder.set_max_iterations(100);
            match finder.bisection(&callable, 1.0, 2.0) {
                Ok(result) => println!("{:?}", result),
                Err(err) => println!("bisection failed: {}", err),
            }
            match bisection(|x: f64| x.cos() - x, 0.0, 1.0, 1e-8) {
                Ok(root) => println!("cos(x) = x at {}", root),
                Err(err) => println!("bisection failed: {}", err),
            }
        }
        7 => {
            // CUSTOM SETTINGS DOCUMENT AND PARALLEL ANALYSIS
            let document = "roots window: -20, 20 max_roots: 20 \n samples window: -5, 5 step: 0.5";
            let config = match AnalysisConfig::from_document(document) {
                Ok(config) => config,
                Err(err) => return println!("bad settings: {}", err),
            };
            match analyze_parallel("sin(x)", &config) {
                Ok(report) => println!("{}", report.with_point(1.5)),
                Err(err) => println!("{}", err),
            }
        }
        _ => {
            println!("example {} does not exist", example);
        }
    }
}
