//! Exact image of the natural domain through an expression where the variable occurs once.
//!
//! Such an expression is a chain `f_n ∘ ... ∘ f_1` of one-argument steps. The image is
//! pushed through the chain interval by interval: monotone steps map endpoints, even
//! steps (`|t|`, `t^2`) fold at zero, `sin`/`cos` are clipped to their extrema, and
//! restricted steps (`ln`, even roots, `arcsin`, `arccos`) first cut the incoming set
//! down to where they are defined.
use crate::errors::SolverInconclusive;
use crate::symbolic::real_sets::{Interval, RealSet};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{as_rational, real_powf};
use std::f64::consts::{FRAC_PI_2, PI};

const INF: f64 = f64::INFINITY;

/// Image of the natural domain of `expr` (an expression with a single occurrence of `var`).
pub fn image_of_domain(expr: &Expr, var: &str) -> Result<RealSet, SolverInconclusive> {
    if expr.occurrences(var) != 1 {
        return Err(SolverInconclusive::Unsupported(format!(
            "'{}' occurs {} times in {}",
            var,
            expr.occurrences(var),
            expr
        )));
    }
    image(expr, var)
}

fn unsupported(expr: &Expr) -> SolverInconclusive {
    SolverInconclusive::Unsupported(format!("no exact image for {}", expr))
}

fn constant(expr: &Expr) -> Result<f64, SolverInconclusive> {
    expr.constant_value().ok_or_else(|| unsupported(expr))
}

fn image(expr: &Expr, var: &str) -> Result<RealSet, SolverInconclusive> {
    let inner = |e: &Expr| image(e, var);
    match expr {
        Expr::Var(_) => Ok(RealSet::all()),
        Expr::Add(lhs, rhs) => {
            let (a, c) = if lhs.contains_variable(var) { (lhs, rhs) } else { (rhs, lhs) };
            let c = constant(c)?;
            Ok(monotone(&inner(a)?, |t| t + c, true))
        }
        Expr::Sub(lhs, rhs) if lhs.contains_variable(var) => {
            let c = constant(rhs)?;
            Ok(monotone(&inner(lhs)?, |t| t - c, true))
        }
        Expr::Sub(lhs, rhs) => {
            let c = constant(lhs)?;
            Ok(monotone(&inner(rhs)?, |t| c - t, false))
        }
        Expr::Mul(lhs, rhs) => {
            let (a, c) = if lhs.contains_variable(var) { (lhs, rhs) } else { (rhs, lhs) };
            let c = constant(c)?;
            let set = inner(a)?;
            if c == 0.0 {
                return Ok(if set.is_empty() { set } else { RealSet::from_points(&[0.0]) });
            }
            Ok(monotone(&set, |t| c * t, c > 0.0))
        }
        Expr::Div(lhs, rhs) if lhs.contains_variable(var) => {
            let c = constant(rhs)?;
            if c == 0.0 {
                return Err(unsupported(expr));
            }
            Ok(monotone(&inner(lhs)?, |t| t / c, c > 0.0))
        }
        Expr::Pow(base, exp) if base.contains_variable(var) => {
            let c = constant(exp)?;
            let set = inner(base)?;
            if c == 0.0 {
                return Ok(if set.is_empty() { set } else { RealSet::from_points(&[1.0]) });
            }
            if c < 0.0 {
                return Err(unsupported(expr));
            }
            let power = move |t: f64| real_powf(t, c);
            match as_rational(c) {
                Some((p, q)) if q % 2 == 1 => {
                    if p % 2 == 0 {
                        Ok(even(&set, power))
                    } else {
                        Ok(monotone(&set, power, true))
                    }
                }
                _ => Ok(monotone(&restrict(&set, Interval::new(0.0, INF, true, false)), power, true)),
            }
        }
        Expr::Pow(base, exp) => {
            let b = constant(base)?;
            let set = inner(exp)?;
            if b <= 0.0 {
                return Err(unsupported(expr));
            }
            if b == 1.0 {
                return Ok(if set.is_empty() { set } else { RealSet::from_points(&[1.0]) });
            }
            Ok(monotone(&set, |t| b.powf(t), b > 1.0))
        }
        Expr::Exp(arg) => Ok(monotone(&inner(arg)?, f64::exp, true)),
        Expr::Ln(arg) => {
            let set = restrict(&inner(arg)?, Interval::open(0.0, INF));
            Ok(monotone(&set, f64::ln, true))
        }
        Expr::arctg(arg) => Ok(monotone(&inner(arg)?, f64::atan, true)),
        Expr::arcsin(arg) => {
            let set = restrict(&inner(arg)?, Interval::closed(-1.0, 1.0));
            Ok(monotone(&set, f64::asin, true))
        }
        Expr::arccos(arg) => {
            let set = restrict(&inner(arg)?, Interval::closed(-1.0, 1.0));
            Ok(monotone(&set, f64::acos, false))
        }
        Expr::Abs(arg) => Ok(even(&inner(arg)?, f64::abs)),
        Expr::sin(arg) => Ok(periodic(&inner(arg)?, f64::sin, FRAC_PI_2, -FRAC_PI_2)),
        Expr::cos(arg) => Ok(periodic(&inner(arg)?, f64::cos, 0.0, PI)),
        _ => Err(unsupported(expr)),
    }
}

fn restrict(set: &RealSet, allowed: Interval) -> RealSet {
    set.intersect(&RealSet::from_intervals(vec![allowed]))
}

/// Image through a monotone map; infinite endpoints go to the limits of `f`.
fn monotone<F: Fn(f64) -> f64>(set: &RealSet, f: F, increasing: bool) -> RealSet {
    let pieces = set
        .intervals()
        .iter()
        .map(|i| {
            let (lo, hi) = (f(i.lo), f(i.hi));
            if increasing {
                Interval::new(lo, hi, i.lo_closed, i.hi_closed)
            } else {
                Interval::new(hi, lo, i.hi_closed, i.lo_closed)
            }
        })
        .collect();
    RealSet::from_intervals(pieces)
}

/// Image through an even map increasing on [0, ∞) (|t|, t^2, t^(2/3)).
fn even<F: Fn(f64) -> f64>(set: &RealSet, f: F) -> RealSet {
    let pieces = set
        .intervals()
        .iter()
        .map(|i| {
            if i.lo >= 0.0 {
                Interval::new(f(i.lo), f(i.hi), i.lo_closed, i.hi_closed)
            } else if i.hi <= 0.0 {
                Interval::new(f(i.hi), f(i.lo), i.hi_closed, i.lo_closed)
            } else {
                let (left, right) = (f(i.lo), f(i.hi));
                let (top, top_closed) = if left > right {
                    (left, i.lo_closed)
                } else if right > left {
                    (right, i.hi_closed)
                } else {
                    (left, i.lo_closed || i.hi_closed)
                };
                Interval::new(f(0.0), top, true, top_closed)
            }
        })
        .collect();
    RealSet::from_intervals(pieces)
}

/// Image through sin or cos given the phases of their maxima and minima.
fn periodic<F: Fn(f64) -> f64>(set: &RealSet, f: F, max_phase: f64, min_phase: f64) -> RealSet {
    let hits = |i: &Interval, phase: f64| {
        let k = ((i.lo - phase) / (2.0 * PI)).ceil();
        let first = phase + 2.0 * PI * k;
        i.contains(first) || i.contains(first - 2.0 * PI)
    };
    let pieces = set
        .intervals()
        .iter()
        .map(|i| {
            if !i.lo.is_finite() || !i.hi.is_finite() || i.hi - i.lo >= 2.0 * PI {
                return Interval::closed(-1.0, 1.0);
            }
            let ends = [(f(i.lo), i.lo_closed), (f(i.hi), i.hi_closed)];
            let (top, top_closed) = if hits(i, max_phase) {
                (1.0, true)
            } else {
                extreme(&ends, |a, b| a > b)
            };
            let (bottom, bottom_closed) = if hits(i, min_phase) {
                (-1.0, true)
            } else {
                extreme(&ends, |a, b| a < b)
            };
            Interval::new(bottom, top, bottom_closed, top_closed)
        })
        .collect();
    RealSet::from_intervals(pieces)
}

fn extreme(ends: &[(f64, bool); 2], better: impl Fn(f64, f64) -> bool) -> (f64, bool) {
    let [(a, a_closed), (b, b_closed)] = *ends;
    if better(a, b) {
        (a, a_closed)
    } else if better(b, a) {
        (b, b_closed)
    } else {
        (a, a_closed || b_closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::parse_expression_func;

    fn image_text(text: &str) -> String {
        image_of_domain(&parse_expression_func(text).unwrap(), "x")
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_monotone_chains() {
        assert_eq!(image_text("exp(x)"), "(0, ∞)");
        assert_eq!(image_text("ln(x - 1)"), "ℝ");
        assert_eq!(image_text("sqrt(x)"), "[0, ∞)");
        assert_eq!(image_text("2 - sqrt(x + 3)"), "(-∞, 2]");
        assert_eq!(image_text("arctan(x)"), "(-1.5708, 1.5708)");
        assert_eq!(image_text("x^(1/3)"), "ℝ");
    }

    #[test]
    fn test_even_and_periodic_steps() {
        assert_eq!(image_text("abs(x)"), "[0, ∞)");
        assert_eq!(image_text("(x - 1)^2 + 3"), "[3, ∞)");
        assert_eq!(image_text("sin(x)"), "[-1, 1]");
        assert_eq!(image_text("3cos(2x)"), "[-3, 3]");
        assert_eq!(image_text("sin(arcsin(x))"), "[-1, 1]");
        assert_eq!(image_text("sqrt(-x^2)"), "{0}");
    }

    #[test]
    fn test_rejections() {
        let twice = parse_expression_func("x*sin(x)").unwrap();
        assert!(image_of_domain(&twice, "x").is_err());
        let pole = parse_expression_func("1/x").unwrap();
        assert!(image_of_domain(&pole, "x").is_err());
        let tangent = parse_expression_func("tan(x)").unwrap();
        assert!(image_of_domain(&tangent, "x").is_err());
    }
}
