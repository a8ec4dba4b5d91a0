//! Axis intersections: y-intercept by substitution, x-intercepts by exact solving with
//! a numeric sign-change scan as the fallback.
use crate::analysis::config::RootSettings;
use crate::errors::{PointFailure, SolverInconclusive};
use crate::numerical::root_scan::scan_roots;
use crate::symbolic::expression::Expression;
use crate::symbolic::symbolic_lambdify::compile;
use crate::symbolic::symbolic_solve::solve_equation;
use crate::symbolic::utils::{format_number, round_to};
use log::{info, warn};
use std::fmt;

/// How the x-intercepts were found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RootMethod {
    /// closed-form solution of f(x) = 0
    Exact,
    /// sign-change scan with bisection refinement in a window
    Numeric { window: (f64, f64), step: f64 },
}

impl fmt::Display for RootMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RootMethod::Exact => write!(f, "exact solution of f(x) = 0"),
            RootMethod::Numeric { window, step } => write!(
                f,
                "numeric sign-change scan on [{}, {}] with step {}, refined by bisection",
                format_number(window.0),
                format_number(window.1),
                format_number(*step)
            ),
        }
    }
}

/// Axis intersections of the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersections {
    /// ascending, deduplicated, capped
    pub x_roots: Vec<f64>,
    /// f(0), NaN when 0 is outside the domain or f(0) is not real
    pub y0: f64,
    /// why f(0) is NaN
    pub y0_failure: Option<PointFailure>,
    pub method: RootMethod,
}

/// Intersections with the default search settings.
pub fn find_intersections(expr: &Expression) -> Intersections {
    find_intersections_with(expr, &RootSettings::default())
}

pub fn find_intersections_with(expr: &Expression, settings: &RootSettings) -> Intersections {
    let callable = match compile(expr) {
        Ok(callable) => Some(callable),
        Err(err) => {
            warn!("{} cannot be evaluated numerically: {}", expr, err);
            None
        }
    };
    let (y0, y0_failure) = match callable.as_ref().map(|f| f.evaluate(0.0)) {
        Some(Ok(value)) => (value, None),
        Some(Err(failure)) => (f64::NAN, Some(failure)),
        None => (f64::NAN, None),
    };

    let (x_roots, method) = match solve_equation(expr.tree(), expr.variable()) {
        Ok(roots) => {
            let mut rounded: Vec<f64> = roots
                .into_iter()
                .map(|r| round_to(r, settings.digits))
                .collect();
            rounded.dedup_by(|later, kept| (*later - *kept).abs() < settings.dedup_threshold);
            rounded.truncate(settings.max_exact_roots);
            (rounded, RootMethod::Exact)
        }
        Err(reason) => {
            log_fallback(expr, &reason);
            let roots = callable
                .as_ref()
                .map(|f| scan_roots(f, settings).into_iter().map(|r| r.x).collect())
                .unwrap_or_default();
            (
                roots,
                RootMethod::Numeric {
                    window: settings.window,
                    step: settings.step,
                },
            )
        }
    };
    info!(
        "intersections of {}: {} x-intercept(s) by {:?}, y0 = {}",
        expr,
        x_roots.len(),
        method,
        y0
    );
    Intersections {
        x_roots,
        y0,
        y0_failure,
        method,
    }
}

fn log_fallback(expr: &Expression, reason: &SolverInconclusive) {
    info!(
        "exact roots of {} unavailable ({}), scanning numerically",
        expr, reason
    );
}
