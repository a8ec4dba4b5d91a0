//! Range estimation as an ordered list of strategies, the first success wins:
//! exact symbolic image, boundary limits (unboundedness), numeric sampling.
use crate::analysis::config::RangeSettings;
use crate::analysis::domain::analyze_domain;
use crate::errors::SolverInconclusive;
use crate::numerical::sampling::sample;
use crate::symbolic::expression::Expression;
use crate::symbolic::polynomial::Polynomial;
use crate::symbolic::real_sets::{Interval, RealSet};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_image::image_of_domain;
use crate::symbolic::symbolic_lambdify::compile;
use crate::symbolic::symbolic_limits::{Direction, LimitResult, limit_at_infinity, limits_at_point};
use crate::symbolic::symbolic_solve::solve_for;
use crate::symbolic::utils::format_number;
use log::{debug, info};
use std::f64::consts::FRAC_PI_2;
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Outcome of a range estimate.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeResult {
    /// the exact set of values
    Exact(RealSet),
    /// the function takes arbitrarily large values
    Unbounded { reason: String },
    /// min and max of the finite samples in a window
    Approximate {
        min: f64,
        max: f64,
        window: (f64, f64),
        step: f64,
    },
    Undetermined,
}

impl RangeResult {
    /// Infimum and supremum when known.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            RangeResult::Exact(set) => set.bounds(),
            RangeResult::Approximate { min, max, .. } => Some((*min, *max)),
            _ => None,
        }
    }

    /// How the result was obtained, for the report.
    pub fn method(&self) -> String {
        match self {
            RangeResult::Exact(_) => "computed exactly from the expression".to_string(),
            RangeResult::Unbounded { .. } => "detected by limit analysis".to_string(),
            RangeResult::Approximate { window, step, .. } => format!(
                "estimated from samples on [{}, {}] with step {}; values with |y| ≥ cutoff are ignored",
                format_number(window.0),
                format_number(window.1),
                format_number(*step)
            ),
            RangeResult::Undetermined => "no finite value found in the sampling window".to_string(),
        }
    }
}

impl fmt::Display for RangeResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RangeResult::Exact(set) => write!(f, "{}", set),
            RangeResult::Unbounded { reason } => write!(f, "unbounded ({})", reason),
            RangeResult::Approximate { min, max, .. } => {
                write!(f, "approximately [{:.2}, {:.2}]", min, max)
            }
            RangeResult::Undetermined => write!(f, "could not be determined"),
        }
    }
}

/// Range strategies in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum RangeStrategy {
    #[strum(serialize = "exact")]
    Exact,
    #[strum(serialize = "boundary limits")]
    BoundaryLimits,
    #[strum(serialize = "sampling")]
    Sampling,
}

impl RangeStrategy {
    pub fn attempt(
        &self,
        expr: &Expression,
        settings: &RangeSettings,
    ) -> Result<RangeResult, SolverInconclusive> {
        match self {
            RangeStrategy::Exact => exact_range(expr).map(RangeResult::Exact),
            RangeStrategy::BoundaryLimits => boundary_limits(expr),
            RangeStrategy::Sampling => sampled_range(expr, settings),
        }
    }
}

/// Range with the default sampling settings.
pub fn estimate_range(expr: &Expression) -> RangeResult {
    estimate_range_with(expr, &RangeSettings::default())
}

pub fn estimate_range_with(expr: &Expression, settings: &RangeSettings) -> RangeResult {
    for strategy in RangeStrategy::iter() {
        match strategy.attempt(expr, settings) {
            Ok(result) => {
                info!("range of {} by {}: {}", expr, strategy, result);
                return result;
            }
            Err(reason) => debug!("range of {}: {} inconclusive: {}", expr, strategy, reason),
        }
    }
    RangeResult::Undetermined
}

/// Constants, polynomials, and expressions with a single occurrence of the variable.
fn exact_range(expr: &Expression) -> Result<RealSet, SolverInconclusive> {
    let tree = expr.tree();
    let var = expr.variable();
    if expr.is_constant() {
        let value = tree.constant_value().ok_or_else(|| {
            SolverInconclusive::Unsupported(format!("{} is not a real constant", tree))
        })?;
        return Ok(RealSet::from_points(&[value]));
    }
    if let Some(poly) = Polynomial::from_expr(tree, var) {
        return Ok(polynomial_range(&poly));
    }
    image_of_domain(tree, var)
}

fn polynomial_range(poly: &Polynomial) -> RealSet {
    if poly.degree() == 0 {
        return RealSet::from_points(&[poly.eval(0.0)]);
    }
    if poly.degree() % 2 == 1 {
        return RealSet::all();
    }
    let values: Vec<f64> = poly
        .derivative()
        .real_roots()
        .into_iter()
        .map(|x| poly.eval(x))
        .collect();
    if poly.leading() > 0.0 {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        RealSet::from_intervals(vec![Interval::new(min, f64::INFINITY, true, false)])
    } else {
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        RealSet::from_intervals(vec![Interval::new(f64::NEG_INFINITY, max, false, true)])
    }
}

/// Unbounded when a limit at ±∞, at an open end of the domain, or at a tangent pole is infinite.
fn boundary_limits(expr: &Expression) -> Result<RangeResult, SolverInconclusive> {
    let tree = expr.tree();
    let var = expr.variable();
    let domain = analyze_domain(expr).domain;
    let Some((lo, hi)) = domain.bounds() else {
        return Err(SolverInconclusive::Unsupported("empty domain".to_string()));
    };
    let unbounded = |limit: LimitResult, approach: String| RangeResult::Unbounded {
        reason: format!("f({}) → {} as {} → {}", var, limit, var, approach),
    };

    for (direction, open_end) in [(Direction::PosInfinity, hi), (Direction::NegInfinity, lo)] {
        if open_end.is_finite() {
            continue;
        }
        let limit = limit_at_infinity(tree, var, direction);
        if limit.is_infinite() {
            return Ok(unbounded(limit, direction.to_string()));
        }
    }

    for interval in domain.intervals() {
        if interval.lo.is_finite() && !interval.lo_closed {
            let (_, right) = limits_at_point(tree, var, interval.lo);
            if right.is_infinite() {
                return Ok(unbounded(right, format!("{}⁺", format_number(interval.lo))));
            }
        }
        if interval.hi.is_finite() && !interval.hi_closed {
            let (left, _) = limits_at_point(tree, var, interval.hi);
            if left.is_infinite() {
                return Ok(unbounded(left, format!("{}⁻", format_number(interval.hi))));
            }
        }
    }

    for pole in tangent_poles(tree, var) {
        let (left, right) = limits_at_point(tree, var, pole);
        if let Some(limit) = [left, right].into_iter().find(LimitResult::is_infinite) {
            return Ok(unbounded(limit, format_number(pole)));
        }
    }
    Err(SolverInconclusive::Unsupported(
        "every boundary limit is finite".to_string(),
    ))
}

/// First pole u = π/2 of every tangent node tg(u).
fn tangent_poles(tree: &Expr, var: &str) -> Vec<f64> {
    let mut poles = Vec::new();
    tree.walk(&mut |node| {
        if let Expr::tg(arg) = node {
            if let Ok(points) = solve_for(arg, var, FRAC_PI_2) {
                poles.extend(points);
            }
        }
    });
    poles
}

fn sampled_range(
    expr: &Expression,
    settings: &RangeSettings,
) -> Result<RangeResult, SolverInconclusive> {
    let callable =
        compile(expr).map_err(|e| SolverInconclusive::Unsupported(e.to_string()))?;
    let samples = sample(&callable, settings.window, settings.step);
    let kept: Vec<f64> = samples
        .iter()
        .map(|(_, y)| *y)
        .filter(|y| y.is_finite() && y.abs() < settings.cutoff)
        .collect();
    debug!(
        "range sampling of {}: kept {} of {} samples",
        expr,
        kept.len(),
        samples.len()
    );
    if kept.is_empty() {
        return Err(SolverInconclusive::Unsupported(
            "no finite sample in the window".to_string(),
        ));
    }
    let min = kept.iter().copied().fold(f64::INFINITY, f64::min);
    let max = kept.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok(RangeResult::Approximate {
        min,
        max,
        window: settings.window,
        step: settings.step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::normalize;
    use approx::assert_relative_eq;

    fn range_of(text: &str) -> RangeResult {
        estimate_range(&normalize(text).unwrap())
    }

    #[test]
    fn test_exact_ranges() {
        assert_eq!(range_of("x^2 - 4").to_string(), "[-4, ∞)");
        assert_eq!(range_of("-x^2 + 2x").to_string(), "(-∞, 1]");
        assert_eq!(range_of("x^3 - x").to_string(), "ℝ");
        assert_eq!(range_of("sqrt(x)").to_string(), "[0, ∞)");
        assert_eq!(range_of("sin(x)").to_string(), "[-1, 1]");
        assert_eq!(range_of("log(x - 1)").to_string(), "ℝ");
        assert_eq!(range_of("exp(-x)").to_string(), "(0, ∞)");
        assert_eq!(range_of("7"), RangeResult::Exact(RealSet::from_points(&[7.0])));
    }

    #[test]
    fn test_reciprocal_is_unbounded_through_its_pole() {
        let result = range_of("1/x");
        assert!(matches!(result, RangeResult::Unbounded { .. }), "{:?}", result);
        assert_eq!(result.bounds(), None);
        assert!(result.to_string().contains("x → 0"));
    }

    #[test]
    fn test_unbounded_at_infinity() {
        let result = range_of("x*sin(x) + x^2");
        assert!(matches!(result, RangeResult::Unbounded { .. }), "{:?}", result);
        assert!(matches!(range_of("tan(x)"), RangeResult::Unbounded { .. }));
        assert!(matches!(range_of("ln(x)/x"), RangeResult::Unbounded { .. }));
    }

    #[test]
    fn test_sampled_range() {
        let result = range_of("x/(x^2 + 1)");
        let (min, max) = result.bounds().unwrap();
        assert_relative_eq!(min, -0.5, epsilon = 1e-9);
        assert_relative_eq!(max, 0.5, epsilon = 1e-9);
        assert!(result.to_string().starts_with("approximately [-0.50, 0.50]"));
        assert!(result.method().contains("[-10, 10]"));
    }

    #[test]
    fn test_sampling_window_follows_settings() {
        let expr = normalize("sin(x) + cos(x)/2 + x/(x^2+1)").unwrap();
        let settings = RangeSettings {
            window: (0.0, 1.0),
            step: 0.5,
            cutoff: 1e6,
        };
        match RangeStrategy::Sampling.attempt(&expr, &settings).unwrap() {
            RangeResult::Approximate { window, step, .. } => {
                assert_eq!(window, (0.0, 1.0));
                assert_eq!(step, 0.5);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_undetermined_and_purity() {
        let settings = RangeSettings::default();
        let expr = normalize("sqrt(-x - 20) + sqrt(-x - 20)").unwrap();
        assert!(RangeStrategy::Sampling.attempt(&expr, &settings).is_err());
        let expr = normalize("x/(x^2 + 1)").unwrap();
        assert_eq!(estimate_range(&expr), estimate_range(&expr));
    }
}
