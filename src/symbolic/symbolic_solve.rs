//! Exact real solving of `f(x) = t` and of the sign conditions `g(x) > 0`, `g(x) >= 0`.
//!
//! Equations are solved by, in order:
//! - reading the left side as a rational function and taking the real roots of
//!   `P(x) - t Q(x)`;
//! - peeling invertible layers off the expression while only one operand depends on `x`
//!   (`exp`, `ln`, `|.|`, powers, inverse trigonometric functions, affine steps);
//! - splitting products and quotients equal to zero into their factors.
//!
//! Every candidate is checked numerically against the original expression, so spurious
//! roots (a zero of the numerator that is also a pole, the wrong sign of an even root)
//! never leave this module. Periodic equations report [`SolverInconclusive::InfiniteSolutionSet`].
//!
//! Inequalities are solved with a sign chart: the zeros of `g` together with the points where
//! `g` stops being defined split the line into pieces on which `g` has constant sign.
use crate::errors::SolverInconclusive;
use crate::symbolic::polynomial::RationalFunction;
use crate::symbolic::real_sets::{Interval, RealSet};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{format_number, is_even_root_exponent};
use log::debug;
use std::f64::consts::{FRAC_PI_2, PI};

/// accepted |f(root) - t| relative to max(1, |t|)
const RESIDUAL_TOLERANCE: f64 = 1e-6;
/// roots closer than this (relative) are merged
const SAME_ROOT: f64 = 1e-9;
/// |g| below this counts as zero on the sign chart
const ZERO_TOLERANCE: f64 = 1e-9;

/// The sign condition of an inequality `g(x) ? 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inequality {
    /// g(x) > 0
    Positive,
    /// g(x) >= 0
    NonNegative,
}

impl Inequality {
    fn holds(&self, value: f64) -> bool {
        match self {
            Inequality::Positive => value > ZERO_TOLERANCE,
            Inequality::NonNegative => value >= -ZERO_TOLERANCE,
        }
    }
}

/// Real solutions of `expr = 0`, ascending.
pub fn solve_equation(expr: &Expr, var: &str) -> Result<Vec<f64>, SolverInconclusive> {
    solve_for(expr, var, 0.0)
}

/// Real solutions of `expr = target`, ascending.
pub fn solve_for(expr: &Expr, var: &str, target: f64) -> Result<Vec<f64>, SolverInconclusive> {
    let found = candidates(expr, var, target)?;
    let func = expr
        .lambdify_checked(var)
        .map_err(|e| SolverInconclusive::Unsupported(e.to_string()))?;
    let scale = 1.0 + target.abs();
    let mut roots: Vec<f64> = found
        .into_iter()
        .filter(|c| c.is_finite())
        .filter(|c| match func(*c) {
            Ok(value) => (value - target).abs() <= RESIDUAL_TOLERANCE * scale,
            Err(_) => false,
        })
        .map(|c| if c == 0.0 { 0.0 } else { c })
        .collect();
    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|a, b| (*a - *b).abs() <= SAME_ROOT * (1.0 + b.abs()));
    debug!("{} = {}: exact roots {:?}", expr, format_number(target), roots);
    Ok(roots)
}

fn unsupported(expr: &Expr, target: f64) -> SolverInconclusive {
    SolverInconclusive::Unsupported(format!(
        "no closed form for {} = {}",
        expr,
        format_number(target)
    ))
}

/// Candidate roots before verification.
fn candidates(expr: &Expr, var: &str, target: f64) -> Result<Vec<f64>, SolverInconclusive> {
    if !target.is_finite() {
        return Err(unsupported(expr, target));
    }
    if !expr.contains_variable(var) {
        let value = expr
            .constant_value()
            .ok_or_else(|| unsupported(expr, target))?;
        return if (value - target).abs() <= RESIDUAL_TOLERANCE * (1.0 + target.abs()) {
            Err(SolverInconclusive::AllReals)
        } else {
            Ok(Vec::new())
        };
    }
    if let Some(rational) = RationalFunction::from_expr(expr, var) {
        let equation = rational
            .numerator
            .add(&rational.denominator.scale(-target));
        if equation.is_zero() {
            return Err(SolverInconclusive::AllReals);
        }
        return Ok(equation.real_roots());
    }
    match expr {
        Expr::Add(lhs, rhs) => match split(lhs, rhs, var) {
            Some((inner, c)) => candidates(inner, var, target - c),
            None => Err(unsupported(expr, target)),
        },
        Expr::Sub(lhs, rhs) => match (lhs.contains_variable(var), rhs.contains_variable(var)) {
            (true, false) => candidates(lhs, var, target + constant(rhs)?),
            (false, true) => candidates(rhs, var, constant(lhs)? - target),
            _ => Err(unsupported(expr, target)),
        },
        Expr::Mul(lhs, rhs) => match split(lhs, rhs, var) {
            Some((_, c)) if c == 0.0 => zero_factor(target),
            Some((inner, c)) => candidates(inner, var, target / c),
            None if target == 0.0 => {
                let mut roots = candidates(lhs, var, 0.0)?;
                roots.extend(candidates(rhs, var, 0.0)?);
                Ok(roots)
            }
            None => Err(unsupported(expr, target)),
        },
        Expr::Div(lhs, rhs) => match (lhs.contains_variable(var), rhs.contains_variable(var)) {
            (true, false) => candidates(lhs, var, target * constant(rhs)?),
            (false, true) => {
                let c = constant(lhs)?;
                if c == 0.0 {
                    zero_factor(target)
                } else if target == 0.0 {
                    Ok(Vec::new())
                } else {
                    candidates(rhs, var, c / target)
                }
            }
            _ if target == 0.0 => candidates(lhs, var, 0.0),
            _ => Err(unsupported(expr, target)),
        },
        Expr::Pow(base, exp) => match (base.contains_variable(var), exp.contains_variable(var)) {
            (true, false) => {
                let c = constant(exp)?;
                if c == 0.0 {
                    zero_factor(target - 1.0)
                } else if target == 0.0 {
                    if c > 0.0 { candidates(base, var, 0.0) } else { Ok(Vec::new()) }
                } else {
                    // the sign is settled by verification
                    let magnitude = target.abs().powf(1.0 / c);
                    branches(base, var, &[magnitude, -magnitude])
                }
            }
            (false, true) => {
                let c = constant(base)?;
                if c <= 0.0 {
                    Err(unsupported(expr, target))
                } else if c == 1.0 {
                    zero_factor(target - 1.0)
                } else if target <= 0.0 {
                    Ok(Vec::new())
                } else {
                    candidates(exp, var, target.ln() / c.ln())
                }
            }
            _ => Err(unsupported(expr, target)),
        },
        Expr::Exp(arg) => {
            if target <= 0.0 {
                Ok(Vec::new())
            } else {
                candidates(arg, var, target.ln())
            }
        }
        Expr::Ln(arg) => candidates(arg, var, target.exp()),
        Expr::Abs(arg) => {
            if target < 0.0 {
                Ok(Vec::new())
            } else if target == 0.0 {
                candidates(arg, var, 0.0)
            } else {
                branches(arg, var, &[target, -target])
            }
        }
        Expr::sin(_) | Expr::cos(_) if target.abs() > 1.0 => Ok(Vec::new()),
        Expr::sin(_) | Expr::cos(_) | Expr::tg(_) => Err(SolverInconclusive::InfiniteSolutionSet),
        Expr::arcsin(arg) => {
            if target.abs() > FRAC_PI_2 {
                Ok(Vec::new())
            } else {
                candidates(arg, var, target.sin())
            }
        }
        Expr::arccos(arg) => {
            if !(0.0..=PI).contains(&target) {
                Ok(Vec::new())
            } else {
                candidates(arg, var, target.cos())
            }
        }
        Expr::arctg(arg) => {
            if target.abs() >= FRAC_PI_2 {
                Ok(Vec::new())
            } else {
                candidates(arg, var, target.tan())
            }
        }
        _ => Err(unsupported(expr, target)),
    }
}

/// `0 · f(x) = t`: every real when t is zero, nothing otherwise.
fn zero_factor(target: f64) -> Result<Vec<f64>, SolverInconclusive> {
    if target.abs() <= RESIDUAL_TOLERANCE {
        Err(SolverInconclusive::AllReals)
    } else {
        Ok(Vec::new())
    }
}

fn branches(expr: &Expr, var: &str, targets: &[f64]) -> Result<Vec<f64>, SolverInconclusive> {
    let mut roots = Vec::new();
    for target in targets {
        roots.extend(candidates(expr, var, *target)?);
    }
    Ok(roots)
}

fn constant(expr: &Expr) -> Result<f64, SolverInconclusive> {
    expr.constant_value().ok_or_else(|| {
        SolverInconclusive::Unsupported(format!("{} is not a real constant", expr))
    })
}

/// For a commutative node: the operand holding `var` and the value of the other one.
fn split<'a>(lhs: &'a Expr, rhs: &'a Expr, var: &str) -> Option<(&'a Expr, f64)> {
    match (lhs.contains_variable(var), rhs.contains_variable(var)) {
        (true, false) => Some((lhs, rhs.constant_value()?)),
        (false, true) => Some((rhs, lhs.constant_value()?)),
        _ => None,
    }
}

/// The set where `g` satisfies `relation` (and is defined).
pub fn solve_inequality(
    g: &Expr,
    var: &str,
    relation: Inequality,
) -> Result<RealSet, SolverInconclusive> {
    if !g.contains_variable(var) {
        let value = constant(g)?;
        return Ok(if relation.holds(value) {
            RealSet::all()
        } else {
            RealSet::empty()
        });
    }
    let func = g
        .lambdify_checked(var)
        .map_err(|e| SolverInconclusive::Unsupported(e.to_string()))?;
    let mut points = match solve_equation(g, var) {
        Ok(roots) => roots,
        Err(SolverInconclusive::AllReals) => Vec::new(),
        Err(other) => return Err(other),
    };
    points.extend(boundary_points(g, var)?);
    points.sort_by(f64::total_cmp);
    points.dedup_by(|a, b| (*a - *b).abs() <= SAME_ROOT * (1.0 + b.abs()));

    let satisfied = |x: f64| func(x).is_ok_and(|value| relation.holds(value));
    let mut pieces = Vec::new();
    if points.is_empty() {
        if satisfied(0.0) {
            pieces.push(Interval::open(f64::NEG_INFINITY, f64::INFINITY));
        }
        return Ok(RealSet::from_intervals(pieces));
    }
    let mut edges = vec![f64::NEG_INFINITY];
    edges.extend(points.iter().copied());
    edges.push(f64::INFINITY);
    for pair in edges.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        let probe = match (lo.is_finite(), hi.is_finite()) {
            (false, _) => hi - 1.0,
            (_, false) => lo + 1.0,
            _ => 0.5 * (lo + hi),
        };
        if satisfied(probe) {
            pieces.push(Interval::open(lo, hi));
        }
    }
    for point in &points {
        if satisfied(*point) {
            pieces.push(Interval::point(*point));
        }
    }
    Ok(RealSet::from_intervals(pieces))
}

/// Points where some subexpression of `g` enters or leaves its own domain.
fn boundary_points(g: &Expr, var: &str) -> Result<Vec<f64>, SolverInconclusive> {
    let mut equations: Vec<(&Expr, f64)> = Vec::new();
    let mut periodic = false;
    g.walk(&mut |node| match node {
        Expr::Div(_, rhs) if rhs.contains_variable(var) => equations.push((rhs.as_ref(), 0.0)),
        Expr::Pow(base, exp) if base.contains_variable(var) => {
            let restricted = exp
                .constant_value()
                .is_some_and(|e| e < 0.0 || is_even_root_exponent(e));
            if restricted {
                equations.push((base.as_ref(), 0.0));
            }
        }
        Expr::Ln(arg) if arg.contains_variable(var) => equations.push((arg.as_ref(), 0.0)),
        Expr::arcsin(arg) | Expr::arccos(arg) if arg.contains_variable(var) => {
            equations.push((arg.as_ref(), 1.0));
            equations.push((arg.as_ref(), -1.0));
        }
        Expr::tg(arg) if arg.contains_variable(var) => periodic = true,
        _ => {}
    });
    if periodic {
        return Err(SolverInconclusive::InfiniteSolutionSet);
    }
    let mut points = Vec::new();
    for (expr, target) in equations {
        match solve_for(expr, var, target) {
            Ok(roots) => points.extend(roots),
            Err(SolverInconclusive::AllReals) => {}
            Err(other) => return Err(other),
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::parse_expression_func;
    use approx::assert_relative_eq;

    fn solve(text: &str) -> Result<Vec<f64>, SolverInconclusive> {
        solve_equation(&parse_expression_func(text).unwrap(), "x")
    }

    fn region(text: &str, relation: Inequality) -> String {
        solve_inequality(&parse_expression_func(text).unwrap(), "x", relation)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_polynomial_equations() {
        assert_eq!(solve("x**2 - 4").unwrap(), vec![-2.0, 2.0]);
        assert_eq!(solve("x**2 + 1").unwrap(), Vec::<f64>::new());
        assert_eq!(solve("2*x + 1").unwrap(), vec![-0.5]);
    }

    #[test]
    fn test_rational_equations_drop_poles() {
        assert_eq!(solve("1/x").unwrap(), Vec::<f64>::new());
        assert_eq!(solve("(x**2 - 1)/(x - 1)").unwrap(), vec![-1.0]);
    }

    #[test]
    fn test_inversion() {
        assert_eq!(solve("x**0.5").unwrap(), vec![0.0]);
        assert_eq!(solve("ln(x - 1)").unwrap(), vec![2.0]);
        let roots = solve("exp(x) - 2").unwrap();
        assert_relative_eq!(roots[0], 2f64.ln(), epsilon = 1e-12);
        assert_eq!(solve("abs(x - 1) - 2").unwrap(), vec![-1.0, 3.0]);
        assert_eq!(solve("(x + 1)**0.5 - 2").unwrap(), vec![3.0]);
        assert_eq!(solve("(x + 1)**0.5 + 2").unwrap(), Vec::<f64>::new());
        let roots = solve("arcsin(x) - pi/6").unwrap();
        assert_relative_eq!(roots[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_products_split() {
        let roots = solve("x*ln(x + 2)").unwrap();
        assert_eq!(roots.len(), 2);
        assert_relative_eq!(roots[0], -1.0, epsilon = 1e-12);
        assert_eq!(roots[1], 0.0);
    }

    #[test]
    fn test_inconclusive() {
        assert_eq!(solve("sin(x)"), Err(SolverInconclusive::InfiniteSolutionSet));
        assert_eq!(solve("sin(x) - 2").unwrap(), Vec::<f64>::new());
        assert!(matches!(
            solve("x + sin(x) + 1"),
            Err(SolverInconclusive::Unsupported(_))
        ));
        assert_eq!(solve("x - x"), Err(SolverInconclusive::AllReals));
    }

    #[test]
    fn test_inequalities() {
        assert_eq!(region("x", Inequality::NonNegative), "[0, ∞)");
        assert_eq!(region("x - 1", Inequality::Positive), "(1, ∞)");
        assert_eq!(region("4 - x**2", Inequality::NonNegative), "[-2, 2]");
        assert_eq!(region("x**2 - 1", Inequality::Positive), "(-∞, -1) ∪ (1, ∞)");
        assert_eq!(region("x**2 + 1", Inequality::Positive), "ℝ");
        assert_eq!(region("1/x", Inequality::Positive), "(0, ∞)");
        assert_eq!(region("x**0.5 - 1", Inequality::NonNegative), "[1, ∞)");
    }

    #[test]
    fn test_periodic_inequality_is_inconclusive() {
        let g = parse_expression_func("sin(x)").unwrap();
        assert_eq!(
            solve_inequality(&g, "x", Inequality::NonNegative),
            Err(SolverInconclusive::InfiniteSolutionSet)
        );
    }
}
