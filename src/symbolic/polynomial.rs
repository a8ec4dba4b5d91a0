//! Dense univariate polynomials and rational functions extracted from an [`Expr`].
//!
//! Used by the exact solver (zeros of polynomial and rational equations), by the domain
//! analyzer (zeros of denominators) and by the range estimator (critical points and pole
//! orders). Real roots above degree two come from the eigenvalues of the companion
//! matrix, polished with Newton steps.
use crate::symbolic::symbolic_engine::Expr;
use log::debug;
use nalgebra::DMatrix;

/// highest integer power expanded when reading a polynomial
const MAX_EXPANDED_POWER: u32 = 32;
/// imaginary part (relative) under which an eigenvalue counts as real
const IMAGINARY_TOLERANCE: f64 = 1e-3;
/// two polished roots closer than this are the same root
const ROOT_MERGE_TOLERANCE: f64 = 1e-7;
/// Euclidean remainder coefficients below this (relative to the dividend) are zero
const GCD_TOLERANCE: f64 = 1e-9;

/// Polynomial with `coeffs[i]` multiplying `x^i`. Trailing zero coefficients are trimmed.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

impl Polynomial {
    pub fn new(mut coeffs: Vec<f64>) -> Self {
        while coeffs.len() > 1 && coeffs.last() == Some(&0.0) {
            coeffs.pop();
        }
        if coeffs.is_empty() {
            coeffs.push(0.0);
        }
        Self { coeffs }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// The polynomial `x`.
    pub fn identity() -> Self {
        Self::new(vec![0.0, 1.0])
    }

    /// Reads `expr` as a polynomial in `var`, expanding products and integer powers.
    pub fn from_expr(expr: &Expr, var: &str) -> Option<Self> {
        if !expr.contains_variable(var) {
            return expr.constant_value().map(Self::constant);
        }
        match expr {
            Expr::Var(name) if name == var => Some(Self::identity()),
            Expr::Add(lhs, rhs) => Some(Self::from_expr(lhs, var)?.add(&Self::from_expr(rhs, var)?)),
            Expr::Sub(lhs, rhs) => Some(
                Self::from_expr(lhs, var)?.add(&Self::from_expr(rhs, var)?.scale(-1.0)),
            ),
            Expr::Mul(lhs, rhs) => Some(Self::from_expr(lhs, var)?.mul(&Self::from_expr(rhs, var)?)),
            Expr::Div(lhs, rhs) if !rhs.contains_variable(var) => {
                let divisor = rhs.constant_value()?;
                if divisor == 0.0 {
                    return None;
                }
                Some(Self::from_expr(lhs, var)?.scale(1.0 / divisor))
            }
            Expr::Pow(base, exp) => {
                let n = non_negative_integer(exp)?;
                Some(Self::from_expr(base, var)?.powi(n))
            }
            _ => None,
        }
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|c| *c == 0.0)
    }

    pub fn leading(&self) -> f64 {
        self.coeffs[self.degree()]
    }

    /// Horner evaluation.
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }

    pub fn add(&self, other: &Self) -> Self {
        let len = self.coeffs.len().max(other.coeffs.len());
        let coeffs = (0..len)
            .map(|i| self.coeffs.get(i).unwrap_or(&0.0) + other.coeffs.get(i).unwrap_or(&0.0))
            .collect();
        Self::new(coeffs)
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.coeffs.iter().map(|c| c * factor).collect())
    }

    pub fn mul(&self, other: &Self) -> Self {
        let mut coeffs = vec![0.0; self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Self::new(coeffs)
    }

    pub fn powi(&self, n: u32) -> Self {
        (0..n).fold(Self::constant(1.0), |acc, _| acc.mul(self))
    }

    pub fn derivative(&self) -> Self {
        if self.coeffs.len() == 1 {
            return Self::constant(0.0);
        }
        Self::new(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * i as f64)
                .collect(),
        )
    }

    /// Synthetic division by `(x - root)`: returns the quotient and the remainder `p(root)`.
    pub fn deflate(&self, root: f64) -> (Self, f64) {
        if self.coeffs.len() == 1 {
            return (Self::constant(0.0), self.coeffs[0]);
        }
        let mut quotient = vec![0.0; self.coeffs.len() - 1];
        let mut carry = 0.0;
        for i in (0..self.coeffs.len()).rev() {
            carry = carry * root + self.coeffs[i];
            if i > 0 {
                quotient[i - 1] = carry;
            }
        }
        (Self::new(quotient), carry)
    }

    /// Long division: `self = quotient * divisor + remainder`, deg(remainder) < deg(divisor).
    pub fn div_rem(&self, divisor: &Self) -> (Self, Self) {
        let (n, d) = (self.degree(), divisor.degree());
        if divisor.is_zero() || n < d {
            return (Self::constant(0.0), self.clone());
        }
        let lead = divisor.leading();
        let mut remainder = self.coeffs.clone();
        let mut quotient = vec![0.0; n - d + 1];
        for k in (0..=n - d).rev() {
            let factor = remainder[k + d] / lead;
            quotient[k] = factor;
            for (j, c) in divisor.coeffs.iter().enumerate() {
                remainder[k + j] -= factor * c;
            }
            remainder[k + d] = 0.0;
        }
        remainder.truncate(d);
        (Self::new(quotient), Self::new(remainder))
    }

    /// Monic greatest common divisor by the Euclidean algorithm; remainders are cleaned of
    /// rounding noise relative to the dividend.
    pub fn gcd(&self, other: &Self) -> Self {
        let (mut a, mut b) = (self.clone(), other.clone());
        while !b.is_zero() {
            let scale = a.coeffs.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
            let (_, remainder) = a.div_rem(&b);
            let cleaned = remainder
                .coeffs
                .iter()
                .map(|c| if c.abs() <= GCD_TOLERANCE * scale { 0.0 } else { *c })
                .collect();
            a = b;
            b = Self::new(cleaned);
        }
        a.scale(1.0 / a.leading())
    }

    /// The product of the distinct linear factors: `p / gcd(p, p')`. Every root of the
    /// result is simple, which keeps the eigenvalue step accurate on repeated roots.
    pub fn square_free(&self) -> Self {
        if self.degree() < 2 {
            return self.clone();
        }
        let common = self.gcd(&self.derivative());
        if common.degree() == 0 {
            return self.clone();
        }
        debug!("repeated roots: dividing out a common factor of degree {}", common.degree());
        self.div_rem(&common).0
    }

    /// Order of `root` as a zero of the polynomial (0 when it is not a zero).
    pub fn multiplicity(&self, root: f64) -> usize {
        let mut current = self.clone();
        let mut order = 0;
        while !current.is_zero() && current.degree() > 0 {
            let tolerance = 1e-9 * current.magnitude_at(root);
            let (quotient, remainder) = current.deflate(root);
            if remainder.abs() > tolerance {
                break;
            }
            order += 1;
            current = quotient;
        }
        order
    }

    /// Sum of |c_i x^i|, the natural scale for residual checks at `x`.
    fn magnitude_at(&self, x: f64) -> f64 {
        self.coeffs
            .iter()
            .enumerate()
            .map(|(i, c)| (c * x.powi(i as i32)).abs())
            .sum::<f64>()
            .max(f64::MIN_POSITIVE)
    }

    /// Sorted, distinct real roots. The zero polynomial has none (the caller decides
    /// what "every real" means for it).
    pub fn real_roots(&self) -> Vec<f64> {
        if self.is_zero() {
            return Vec::new();
        }
        let mut roots = Vec::new();
        // factor out x^k first: the companion matrix handles zero roots poorly
        let shift = self.coeffs.iter().take_while(|c| **c == 0.0).count();
        if shift > 0 {
            roots.push(0.0);
        }
        let reduced = Self::new(self.coeffs[shift..].to_vec()).square_free();
        let candidates = match reduced.degree() {
            0 => Vec::new(),
            1 => vec![-reduced.coeffs[0] / reduced.coeffs[1]],
            2 => quadratic_roots(reduced.coeffs[2], reduced.coeffs[1], reduced.coeffs[0]),
            _ => reduced.companion_roots(),
        };
        roots.extend(candidates);
        roots.sort_by(|a, b| a.total_cmp(b));
        roots.dedup_by(|a, b| (*a - *b).abs() < ROOT_MERGE_TOLERANCE * (1.0 + b.abs()));
        roots
            .into_iter()
            .map(|r| if r == 0.0 { 0.0 } else { r })
            .collect()
    }

    fn companion_roots(&self) -> Vec<f64> {
        let degree = self.degree();
        let leading = self.leading();
        let mut companion = DMatrix::<f64>::zeros(degree, degree);
        for row in 1..degree {
            companion[(row, row - 1)] = 1.0;
        }
        for column in 0..degree {
            companion[(0, column)] = -self.coeffs[degree - 1 - column] / leading;
        }
        let eigenvalues = companion.complex_eigenvalues();
        let derivative = self.derivative();
        let mut roots = Vec::new();
        for z in eigenvalues.iter() {
            if !z.re.is_finite() || z.im.abs() > IMAGINARY_TOLERANCE * (1.0 + z.re.abs()).sqrt() {
                continue;
            }
            let polished = newton_polish(self, &derivative, z.re);
            if self.eval(polished).abs() <= 1e-8 * self.magnitude_at(polished) {
                roots.push(polished);
            } else {
                debug!("discarded companion eigenvalue {} (residual too large)", z);
            }
        }
        roots
    }
}

fn non_negative_integer(expr: &Expr) -> Option<u32> {
    let value = expr.constant_value()?;
    if value >= 0.0 && value.fract() == 0.0 && value <= MAX_EXPANDED_POWER as f64 {
        Some(value as u32)
    } else {
        None
    }
}

fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    let discriminant = b * b - 4.0 * a * c;
    let scale = (b * b).max((4.0 * a * c).abs()).max(f64::MIN_POSITIVE);
    if discriminant < -1e-12 * scale {
        return Vec::new();
    }
    if discriminant.abs() <= 1e-12 * scale {
        return vec![-b / (2.0 * a)];
    }
    // numerically stable pair
    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    if q == 0.0 {
        let r = (-c / a).sqrt();
        return vec![-r, r];
    }
    vec![q / a, c / q]
}

fn newton_polish(p: &Polynomial, dp: &Polynomial, start: f64) -> f64 {
    let mut x = start;
    for _ in 0..50 {
        let slope = dp.eval(x);
        if slope == 0.0 {
            break;
        }
        let step = p.eval(x) / slope;
        if !step.is_finite() {
            break;
        }
        x -= step;
        if step.abs() <= 1e-15 * (1.0 + x.abs()) {
            break;
        }
    }
    x
}

/// Quotient of two polynomials in one variable, built by recursive combination.
#[derive(Clone, Debug, PartialEq)]
pub struct RationalFunction {
    pub numerator: Polynomial,
    pub denominator: Polynomial,
}

impl RationalFunction {
    fn from_polynomial(numerator: Polynomial) -> Self {
        Self {
            numerator,
            denominator: Polynomial::constant(1.0),
        }
    }

    /// Reads `expr` as `P(x)/Q(x)`. Fails on anything transcendental or radical.
    pub fn from_expr(expr: &Expr, var: &str) -> Option<Self> {
        if !expr.contains_variable(var) {
            return expr
                .constant_value()
                .map(|c| Self::from_polynomial(Polynomial::constant(c)));
        }
        match expr {
            Expr::Var(name) if name == var => Some(Self::from_polynomial(Polynomial::identity())),
            Expr::Add(lhs, rhs) => {
                Some(Self::from_expr(lhs, var)?.add(&Self::from_expr(rhs, var)?, 1.0))
            }
            Expr::Sub(lhs, rhs) => {
                Some(Self::from_expr(lhs, var)?.add(&Self::from_expr(rhs, var)?, -1.0))
            }
            Expr::Mul(lhs, rhs) => {
                let (a, b) = (Self::from_expr(lhs, var)?, Self::from_expr(rhs, var)?);
                Some(Self {
                    numerator: a.numerator.mul(&b.numerator),
                    denominator: a.denominator.mul(&b.denominator),
                })
            }
            Expr::Div(lhs, rhs) => {
                let (a, b) = (Self::from_expr(lhs, var)?, Self::from_expr(rhs, var)?);
                if b.numerator.is_zero() {
                    return None;
                }
                Some(Self {
                    numerator: a.numerator.mul(&b.denominator),
                    denominator: a.denominator.mul(&b.numerator),
                })
            }
            Expr::Pow(base, exp) => {
                let value = exp.constant_value()?;
                if value.fract() != 0.0 || value.abs() > MAX_EXPANDED_POWER as f64 {
                    return None;
                }
                let base = Self::from_expr(base, var)?;
                let n = value.abs() as u32;
                let (num, den) = (base.numerator.powi(n), base.denominator.powi(n));
                if value >= 0.0 {
                    Some(Self { numerator: num, denominator: den })
                } else {
                    Some(Self { numerator: den, denominator: num })
                }
            }
            _ => None,
        }
    }

    fn add(&self, other: &Self, sign: f64) -> Self {
        if self.denominator == other.denominator {
            return Self {
                numerator: self.numerator.add(&other.numerator.scale(sign)),
                denominator: self.denominator.clone(),
            };
        }
        Self {
            numerator: self
                .numerator
                .mul(&other.denominator)
                .add(&other.numerator.mul(&self.denominator).scale(sign)),
            denominator: self.denominator.mul(&other.denominator),
        }
    }

    /// Pole order minus zero order at `point`; positive means a genuine pole.
    pub fn pole_order(&self, point: f64) -> i64 {
        self.denominator.multiplicity(point) as i64 - self.numerator.multiplicity(point) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::parse_expression_func;
    use approx::assert_relative_eq;

    fn poly(text: &str) -> Polynomial {
        Polynomial::from_expr(&parse_expression_func(text).unwrap(), "x").unwrap()
    }

    #[test]
    fn test_from_expr_expands() {
        assert_eq!(poly("(x + 1)^2").coeffs(), &[1.0, 2.0, 1.0]);
        assert_eq!(poly("x^2 - 4").coeffs(), &[-4.0, 0.0, 1.0]);
        assert_eq!(poly("x/2").coeffs(), &[0.0, 0.5]);
        assert!(Polynomial::from_expr(&parse_expression_func("sin(x)").unwrap(), "x").is_none());
        assert!(Polynomial::from_expr(&parse_expression_func("1/x").unwrap(), "x").is_none());
    }

    #[test]
    fn test_low_degree_roots() {
        assert_eq!(poly("2x - 3").real_roots(), vec![1.5]);
        assert_eq!(poly("x^2 - 4").real_roots(), vec![-2.0, 2.0]);
        assert_eq!(poly("x^2 + 1").real_roots(), Vec::<f64>::new());
        assert_eq!(poly("x^2 - 2x + 1").real_roots(), vec![1.0]);
        assert_eq!(poly("x^3").real_roots(), vec![0.0]);
    }

    #[test]
    fn test_companion_roots() {
        let roots = poly("(x - 1)(x - 2)(x + 3)").real_roots();
        assert_eq!(roots.len(), 3);
        assert_relative_eq!(roots[0], -3.0, epsilon = 1e-9);
        assert_relative_eq!(roots[1], 1.0, epsilon = 1e-9);
        assert_relative_eq!(roots[2], 2.0, epsilon = 1e-9);
        let roots = poly("x^4 - 5x^2 + 4").real_roots();
        assert_eq!(roots.len(), 4);
        assert_relative_eq!(roots[3], 2.0, epsilon = 1e-9);
        let roots = poly("x^3 + x + 1").real_roots();
        assert_eq!(roots.len(), 1);
        assert_relative_eq!(roots[0], -0.6823278038280193, epsilon = 1e-9);
    }

    #[test]
    fn test_derivative_and_multiplicity() {
        let p = poly("(x - 1)^2 (x + 2)");
        assert_eq!(p.derivative().degree(), 2);
        assert_eq!(p.multiplicity(1.0), 2);
        assert_eq!(p.multiplicity(-2.0), 1);
        assert_eq!(p.multiplicity(0.0), 0);
    }

    #[test]
    fn test_rational_function() {
        let expr = parse_expression_func("1/x + x/(x - 1)").unwrap();
        let rf = RationalFunction::from_expr(&expr, "x").unwrap();
        assert_eq!(rf.pole_order(0.0), 1);
        assert_eq!(rf.pole_order(1.0), 1);
        let expr = parse_expression_func("(x^2 - 1)/(x - 1)").unwrap();
        let rf = RationalFunction::from_expr(&expr, "x").unwrap();
        assert_eq!(rf.pole_order(1.0), 0);
        let expr = parse_expression_func("x^-2").unwrap();
        let rf = RationalFunction::from_expr(&expr, "x").unwrap();
        assert_eq!(rf.pole_order(0.0), 2);
    }

    #[test]
    fn test_repeated_roots_are_reported_once() {
        let roots = poly("(x - 1)^3").real_roots();
        assert_eq!(roots.len(), 1);
        assert_relative_eq!(roots[0], 1.0, epsilon = 1e-12);
        let roots = poly("(x - 3)^6").real_roots();
        assert_eq!(roots.len(), 1);
        assert_relative_eq!(roots[0], 3.0, epsilon = 1e-9);
        let roots = poly("x^2 (x - 1)^4").real_roots();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0], 0.0);
        assert_relative_eq!(roots[1], 1.0, epsilon = 1e-9);
        let roots = poly("(x - 2)^5 (x + 1)").real_roots();
        assert_eq!(roots.len(), 2);
        assert_relative_eq!(roots[0], -1.0, epsilon = 1e-9);
        assert_relative_eq!(roots[1], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_gcd_and_square_free() {
        let p = poly("(x - 1)^2 (x + 2)");
        assert_eq!(p.gcd(&p.derivative()).degree(), 1);
        let square_free = p.square_free();
        assert_eq!(square_free.degree(), 2);
        assert_relative_eq!(square_free.eval(1.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(square_free.eval(-2.0), 0.0, epsilon = 1e-12);
        let simple = poly("x^2 - 4");
        assert_eq!(simple.square_free(), simple);
        let (quotient, remainder) = poly("x^3 - 1").div_rem(&poly("x - 1"));
        assert_eq!(quotient.coeffs(), &[1.0, 1.0, 1.0]);
        assert!(remainder.is_zero());
    }
}
