//! Limits of an expression as the variable tends to ±∞, and divergence at finite poles.
//!
//! Limits at infinity are propagated bottom-up through the tree with the usual
//! algebra of limits. Indeterminate forms (∞ - ∞, 0 · ∞, ∞ / ∞) are settled by degree
//! comparison when the subexpression is a rational function, and by a numeric probe on
//! a geometric sequence of abscissae otherwise.
use crate::errors::PointFailure;
use crate::symbolic::polynomial::RationalFunction;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{as_rational, real_powf};
use log::debug;
use std::f64::consts::FRAC_PI_2;
use std::fmt;

/// magnitude from which a probed value counts as blowing up
const DIVERGENCE_CUTOFF: f64 = 1e6;
/// abscissae probed when the algebra of limits is inconclusive
const FAR_PROBES: [f64; 4] = [1e3, 1e6, 1e9, 1e12];
/// distances probed on each side of a finite pole
const NEAR_PROBES: [f64; 4] = [1e-2, 1e-4, 1e-6, 1e-8];

/// The direction of a limit at infinity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// x → +∞
    PosInfinity,
    /// x → -∞
    NegInfinity,
}

impl Direction {
    fn sign(&self) -> f64 {
        match self {
            Direction::PosInfinity => 1.0,
            Direction::NegInfinity => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::PosInfinity => write!(f, "+∞"),
            Direction::NegInfinity => write!(f, "-∞"),
        }
    }
}

/// The result of a limit computation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LimitResult {
    /// A finite limit value.
    Finite(f64),
    /// The limit is +∞.
    PosInfinity,
    /// The limit is -∞.
    NegInfinity,
    /// No limit, but the values stay inside a bounded set (sin x as x → ∞).
    Bounded,
    /// Could not determine the limit.
    Unknown,
}

impl LimitResult {
    pub fn is_infinite(&self) -> bool {
        matches!(self, LimitResult::PosInfinity | LimitResult::NegInfinity)
    }

    fn infinity(sign: f64) -> Self {
        if sign >= 0.0 {
            LimitResult::PosInfinity
        } else {
            LimitResult::NegInfinity
        }
    }

    fn from_value(value: f64) -> Self {
        if value.is_nan() {
            LimitResult::Unknown
        } else if value.is_infinite() {
            Self::infinity(value)
        } else {
            LimitResult::Finite(value)
        }
    }
}

impl fmt::Display for LimitResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LimitResult::Finite(value) => write!(f, "{}", value),
            LimitResult::PosInfinity => write!(f, "+∞"),
            LimitResult::NegInfinity => write!(f, "-∞"),
            LimitResult::Bounded => write!(f, "no limit (bounded oscillation)"),
            LimitResult::Unknown => write!(f, "unknown"),
        }
    }
}

/// lim f(x) as `var` tends to `direction`.
pub fn limit_at_infinity(expr: &Expr, var: &str, direction: Direction) -> LimitResult {
    let structural = structural_limit(expr, var, direction);
    if structural != LimitResult::Unknown {
        return structural;
    }
    let probed = probe_at_infinity(expr, var, direction);
    debug!("lim {} as {} → {}: probed {}", expr, var, direction, probed);
    probed
}

fn structural_limit(expr: &Expr, var: &str, direction: Direction) -> LimitResult {
    use LimitResult::*;
    if !expr.contains_variable(var) {
        return expr.constant_value().map_or(Unknown, Finite);
    }
    let lim = |e: &Expr| structural_limit(e, var, direction);
    let result = match expr {
        Expr::Var(_) => LimitResult::infinity(direction.sign()),
        Expr::Add(lhs, rhs) => add_limits(lim(lhs), lim(rhs)),
        Expr::Sub(lhs, rhs) => add_limits(lim(lhs), negate(lim(rhs))),
        Expr::Mul(lhs, rhs) => mul_limits(lim(lhs), lim(rhs)),
        Expr::Div(lhs, rhs) => div_limits(lim(lhs), lim(rhs)),
        Expr::Pow(base, exp) => match (base.contains_variable(var), exp.constant_value()) {
            (true, Some(c)) => pow_limit(lim(base), c),
            _ => match (base.constant_value(), lim(exp)) {
                (Some(b), Finite(v)) => from_value(real_powf(b, v)),
                (Some(b), PosInfinity) if b > 1.0 => PosInfinity,
                (Some(b), PosInfinity) if b > 0.0 && b < 1.0 => Finite(0.0),
                (Some(b), NegInfinity) if b > 1.0 => Finite(0.0),
                (Some(b), NegInfinity) if b > 0.0 && b < 1.0 => PosInfinity,
                _ => Unknown,
            },
        },
        Expr::Exp(arg) => match lim(arg) {
            Finite(v) => from_value(v.exp()),
            PosInfinity => PosInfinity,
            NegInfinity => Finite(0.0),
            Bounded => Bounded,
            Unknown => Unknown,
        },
        Expr::Ln(arg) => match lim(arg) {
            Finite(v) if v > 0.0 => Finite(v.ln()),
            PosInfinity => PosInfinity,
            _ => Unknown,
        },
        Expr::sin(arg) | Expr::cos(arg) => match lim(arg) {
            Finite(v) => match expr {
                Expr::sin(_) => Finite(v.sin()),
                _ => Finite(v.cos()),
            },
            Unknown => Unknown,
            _ => Bounded,
        },
        Expr::tg(arg) => match lim(arg) {
            Finite(v) if v.cos().abs() > 1e-12 => Finite(v.tan()),
            _ => Unknown,
        },
        Expr::arctg(arg) => match lim(arg) {
            Finite(v) => Finite(v.atan()),
            PosInfinity => Finite(FRAC_PI_2),
            NegInfinity => Finite(-FRAC_PI_2),
            Bounded => Bounded,
            Unknown => Unknown,
        },
        Expr::arcsin(arg) => match lim(arg) {
            Finite(v) if v.abs() <= 1.0 => Finite(v.asin()),
            _ => Unknown,
        },
        Expr::arccos(arg) => match lim(arg) {
            Finite(v) if v.abs() <= 1.0 => Finite(v.acos()),
            _ => Unknown,
        },
        Expr::Abs(arg) => match lim(arg) {
            Finite(v) => Finite(v.abs()),
            PosInfinity | NegInfinity => PosInfinity,
            other => other,
        },
        Expr::Const(_) | Expr::Pi | Expr::E => Unknown,
    };
    if result == Unknown {
        rational_limit(expr, var, direction)
    } else {
        result
    }
}

fn from_value(value: f64) -> LimitResult {
    LimitResult::from_value(value)
}

fn negate(limit: LimitResult) -> LimitResult {
    use LimitResult::*;
    match limit {
        Finite(v) => Finite(-v),
        PosInfinity => NegInfinity,
        NegInfinity => PosInfinity,
        other => other,
    }
}

fn add_limits(a: LimitResult, b: LimitResult) -> LimitResult {
    use LimitResult::*;
    match (a, b) {
        (Finite(x), Finite(y)) => from_value(x + y),
        (PosInfinity, NegInfinity) | (NegInfinity, PosInfinity) => Unknown,
        (Unknown, _) | (_, Unknown) => Unknown,
        (PosInfinity, _) | (_, PosInfinity) => PosInfinity,
        (NegInfinity, _) | (_, NegInfinity) => NegInfinity,
        _ => Bounded,
    }
}

fn mul_limits(a: LimitResult, b: LimitResult) -> LimitResult {
    use LimitResult::*;
    let sign = |l: LimitResult| match l {
        Finite(v) => v.signum(),
        PosInfinity => 1.0,
        NegInfinity => -1.0,
        _ => 0.0,
    };
    match (a, b) {
        (Finite(x), Finite(y)) => from_value(x * y),
        (Unknown, _) | (_, Unknown) => Unknown,
        (Finite(x), Bounded) | (Bounded, Finite(x)) => {
            if x == 0.0 {
                Finite(0.0)
            } else {
                Bounded
            }
        }
        (Bounded, Bounded) => Bounded,
        (Bounded, _) | (_, Bounded) => Unknown,
        (Finite(x), inf) | (inf, Finite(x)) => {
            if x == 0.0 {
                Unknown
            } else {
                LimitResult::infinity(x.signum() * sign(inf))
            }
        }
        (x, y) => LimitResult::infinity(sign(x) * sign(y)),
    }
}

fn div_limits(a: LimitResult, b: LimitResult) -> LimitResult {
    use LimitResult::*;
    match (a, b) {
        (Finite(_), Finite(y)) if y == 0.0 => Unknown,
        (Finite(x), Finite(y)) => from_value(x / y),
        (Finite(_) | Bounded, PosInfinity | NegInfinity) => Finite(0.0),
        (PosInfinity | NegInfinity, Finite(y)) if y != 0.0 => {
            let sign = if a == PosInfinity { 1.0 } else { -1.0 };
            LimitResult::infinity(sign * y.signum())
        }
        (Bounded, Finite(y)) if y != 0.0 => Bounded,
        _ => Unknown,
    }
}

fn pow_limit(base: LimitResult, exponent: f64) -> LimitResult {
    use LimitResult::*;
    match base {
        Finite(b) => {
            if b == 0.0 && exponent < 0.0 {
                Unknown
            } else {
                from_value(real_powf(b, exponent))
            }
        }
        PosInfinity if exponent > 0.0 => PosInfinity,
        PosInfinity | NegInfinity if exponent < 0.0 => Finite(0.0),
        NegInfinity if exponent > 0.0 => match as_rational(exponent) {
            Some((p, q)) if q % 2 == 1 => {
                if p % 2 == 0 {
                    PosInfinity
                } else {
                    NegInfinity
                }
            }
            _ => Unknown,
        },
        Bounded if exponent > 0.0 && exponent.fract() == 0.0 => Bounded,
        _ => Unknown,
    }
}

/// Degree comparison for P(x)/Q(x).
fn rational_limit(expr: &Expr, var: &str, direction: Direction) -> LimitResult {
    let Some(rational) = RationalFunction::from_expr(expr, var) else {
        return LimitResult::Unknown;
    };
    let (num, den) = (&rational.numerator, &rational.denominator);
    if den.is_zero() {
        return LimitResult::Unknown;
    }
    if num.is_zero() {
        return LimitResult::Finite(0.0);
    }
    let ratio = num.leading() / den.leading();
    let (n, d) = (num.degree(), den.degree());
    if n < d {
        LimitResult::Finite(0.0)
    } else if n == d {
        LimitResult::Finite(ratio)
    } else {
        let parity = direction.sign().powi((n - d) as i32);
        LimitResult::infinity(ratio * parity)
    }
}

/// Magnitude of a probed value: overflow is divergence, other failures are missing values.
fn probe_value(result: Result<f64, PointFailure>) -> Option<f64> {
    match result {
        Ok(value) => Some(value),
        Err(PointFailure::Overflow) => Some(f64::INFINITY),
        Err(_) => None,
    }
}

/// Reads divergence off a sequence of values: non-decreasing magnitude that ends past
/// the cutoff (or overflowed), with a constant sign.
fn divergence(values: &[f64]) -> LimitResult {
    let (Some(first), Some(last)) = (values.first(), values.last()) else {
        return LimitResult::Unknown;
    };
    let growing = values.windows(2).all(|w| w[1].abs() >= w[0].abs())
        && (last.is_infinite() || last.abs() > first.abs());
    let same_sign = values.windows(2).all(|w| w[0].signum() == w[1].signum());
    if growing && same_sign && last.abs() > DIVERGENCE_CUTOFF {
        LimitResult::infinity(last.signum())
    } else {
        LimitResult::Unknown
    }
}

fn probe_at_infinity(expr: &Expr, var: &str, direction: Direction) -> LimitResult {
    let Ok(func) = expr.lambdify_checked(var) else {
        return LimitResult::Unknown;
    };
    let values: Option<Vec<f64>> = FAR_PROBES
        .iter()
        .map(|x| probe_value(func(direction.sign() * x)))
        .collect();
    values.map_or(LimitResult::Unknown, |v| divergence(&v))
}

/// One-sided limits at `point`: `(left, right)`.
///
/// Rational functions are decided exactly from the pole order, everything else by
/// probing `point ± h` for shrinking `h`.
pub fn limits_at_point(expr: &Expr, var: &str, point: f64) -> (LimitResult, LimitResult) {
    if let Some(rational) = RationalFunction::from_expr(expr, var) {
        let order = rational.pole_order(point);
        if order > 0 {
            let near = |side: f64| {
                rational.numerator.eval(point + side * 1e-9)
                    / rational.denominator.eval(point + side * 1e-9)
            };
            return (
                LimitResult::infinity(near(-1.0)),
                LimitResult::infinity(near(1.0)),
            );
        }
    }
    let Ok(func) = expr.lambdify_checked(var) else {
        return (LimitResult::Unknown, LimitResult::Unknown);
    };
    let side = |sign: f64| {
        let values: Option<Vec<f64>> = NEAR_PROBES
            .iter()
            .map(|h| probe_value(func(point + sign * h)))
            .collect();
        values.map_or(LimitResult::Unknown, |v| divergence(&v))
    };
    (side(-1.0), side(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::parse_expression_func;
    use approx::assert_relative_eq;

    fn at(text: &str, direction: Direction) -> LimitResult {
        limit_at_infinity(&parse_expression_func(text).unwrap(), "x", direction)
    }

    #[test]
    fn test_polynomial_limits() {
        assert_eq!(at("x**2 - 4", Direction::PosInfinity), LimitResult::PosInfinity);
        assert_eq!(at("x**2 - 4", Direction::NegInfinity), LimitResult::PosInfinity);
        assert_eq!(at("x**3", Direction::NegInfinity), LimitResult::NegInfinity);
        assert_eq!(at("x - x**2", Direction::PosInfinity), LimitResult::NegInfinity);
    }

    #[test]
    fn test_rational_limits() {
        assert_eq!(at("1/x", Direction::PosInfinity), LimitResult::Finite(0.0));
        match at("(2x + 1)/(x - 3)", Direction::NegInfinity) {
            LimitResult::Finite(v) => assert_relative_eq!(v, 2.0),
            other => panic!("unexpected limit {:?}", other),
        }
    }

    #[test]
    fn test_transcendental_limits() {
        assert_eq!(at("exp(x)", Direction::PosInfinity), LimitResult::PosInfinity);
        assert_eq!(at("exp(x)", Direction::NegInfinity), LimitResult::Finite(0.0));
        assert_eq!(at("sin(x)", Direction::PosInfinity), LimitResult::Bounded);
        assert_eq!(at("ln(x)", Direction::PosInfinity), LimitResult::PosInfinity);
        assert_eq!(at("sqrt(x)", Direction::PosInfinity), LimitResult::PosInfinity);
        match at("arctan(x)", Direction::PosInfinity) {
            LimitResult::Finite(v) => assert_relative_eq!(v, FRAC_PI_2),
            other => panic!("unexpected limit {:?}", other),
        }
    }

    #[test]
    fn test_indeterminate_probe() {
        assert_eq!(at("exp(x) - x**2", Direction::PosInfinity), LimitResult::PosInfinity);
    }

    #[test]
    fn test_poles() {
        let inv = parse_expression_func("1/x").unwrap();
        assert_eq!(
            limits_at_point(&inv, "x", 0.0),
            (LimitResult::NegInfinity, LimitResult::PosInfinity)
        );
        let removable = parse_expression_func("(x**2 - 1)/(x - 1)").unwrap();
        let (left, right) = limits_at_point(&removable, "x", 1.0);
        assert!(!left.is_infinite() && !right.is_infinite());
        let log_pole = parse_expression_func("1/ln(x)").unwrap();
        let (left, right) = limits_at_point(&log_pole, "x", 1.0);
        assert!(left.is_infinite() || right.is_infinite());
    }
}
