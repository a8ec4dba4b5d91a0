//! LAMBDIFICATION - lowering symbolic expressions into numeric closures.
//!
//! The closure tree mirrors the expression tree: every node becomes a boxed closure that
//! evaluates its children and applies the node operation. Each closure returns
//! `Result<f64, PointFailure>` so a failing point (division by zero, log of a non-positive
//! number, even root of a negative number, overflow) travels up as a value and never as a
//! panic or an unnoticed NaN.
use crate::errors::{CompileError, PointFailure};
use crate::symbolic::expression::Expression;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{is_even_root_exponent, real_powf};
use std::f64::consts::{E, PI};
use std::fmt;

/// Compiled closure of one real variable.
pub type CheckedFn = Box<dyn Fn(f64) -> Result<f64, PointFailure> + Send + Sync>;

/// Numeric callable derived from an [`Expression`]. Independent of the expression once built.
pub struct NumericCallable {
    variable: String,
    source: String,
    func: CheckedFn,
}

impl NumericCallable {
    /// Evaluates at one point; domain violations come back as [`PointFailure`].
    pub fn evaluate(&self, x: f64) -> Result<f64, PointFailure> {
        (self.func)(x)
    }

    /// Evaluates at one point, mapping every failure to NaN.
    pub fn value_or_nan(&self, x: f64) -> f64 {
        self.evaluate(x).unwrap_or(f64::NAN)
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Printed form of the expression the callable was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for NumericCallable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NumericCallable({} ↦ {})", self.variable, self.source)
    }
}

/// Lowers an expression into a [`NumericCallable`].
pub fn compile(expr: &Expression) -> Result<NumericCallable, CompileError> {
    let func = expr.tree().lambdify_checked(expr.variable())?;
    Ok(NumericCallable {
        variable: expr.variable().to_string(),
        source: expr.to_string(),
        func,
    })
}

fn checked(value: f64) -> Result<f64, PointFailure> {
    if value.is_nan() {
        Err(PointFailure::NotReal)
    } else if value.is_infinite() {
        Err(PointFailure::Overflow)
    } else {
        Ok(value)
    }
}

fn power(base: f64, exponent: f64) -> Result<f64, PointFailure> {
    if base == 0.0 && exponent < 0.0 {
        return Err(PointFailure::DivisionByZero);
    }
    if base < 0.0 && exponent.fract() != 0.0 && is_even_root_exponent(exponent) {
        return Err(PointFailure::NegativeEvenRoot);
    }
    checked(real_powf(base, exponent))
}

impl Expr {
    /// Converts a single-variable expression into a checked closure over `var`.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let x = Expr::Var("x".to_string());
    /// let f = (Expr::Const(1.0) / x).lambdify_checked("x").unwrap();
    /// assert_eq!(f(2.0), Ok(0.5));
    /// assert_eq!(f(0.0), Err(PointFailure::DivisionByZero));
    /// ```
    pub fn lambdify_checked(&self, var: &str) -> Result<CheckedFn, CompileError> {
        let func: CheckedFn = match self {
            Expr::Var(name) if name == var => Box::new(Ok::<f64, PointFailure>),
            Expr::Var(name) => {
                return Err(CompileError::UnknownVariable {
                    declared: var.to_string(),
                    found: name.clone(),
                });
            }
            Expr::Const(val) => {
                if !val.is_finite() {
                    return Err(CompileError::NonFiniteConstant(*val));
                }
                let val = *val;
                Box::new(move |_| Ok(val))
            }
            Expr::Pi => Box::new(|_| Ok(PI)),
            Expr::E => Box::new(|_| Ok(E)),
            Expr::Add(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_checked(var)?;
                let rhs_fn = rhs.lambdify_checked(var)?;
                Box::new(move |x| checked(lhs_fn(x)? + rhs_fn(x)?))
            }
            Expr::Sub(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_checked(var)?;
                let rhs_fn = rhs.lambdify_checked(var)?;
                Box::new(move |x| checked(lhs_fn(x)? - rhs_fn(x)?))
            }
            Expr::Mul(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_checked(var)?;
                let rhs_fn = rhs.lambdify_checked(var)?;
                Box::new(move |x| checked(lhs_fn(x)? * rhs_fn(x)?))
            }
            Expr::Div(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_checked(var)?;
                let rhs_fn = rhs.lambdify_checked(var)?;
                Box::new(move |x| {
                    let numerator = lhs_fn(x)?;
                    let denominator = rhs_fn(x)?;
                    if denominator == 0.0 {
                        return Err(PointFailure::DivisionByZero);
                    }
                    checked(numerator / denominator)
                })
            }
            Expr::Pow(base, exp) => {
                let base_fn = base.lambdify_checked(var)?;
                let exp_fn = exp.lambdify_checked(var)?;
                Box::new(move |x| power(base_fn(x)?, exp_fn(x)?))
            }
            Expr::Exp(expr) => {
                let expr_fn = expr.lambdify_checked(var)?;
                Box::new(move |x| checked(expr_fn(x)?.exp()))
            }
            Expr::Ln(expr) => {
                let expr_fn = expr.lambdify_checked(var)?;
                Box::new(move |x| {
                    let arg = expr_fn(x)?;
                    if arg <= 0.0 {
                        return Err(PointFailure::NonPositiveLog);
                    }
                    checked(arg.ln())
                })
            }
            Expr::sin(expr) => {
                let expr_fn = expr.lambdify_checked(var)?;
                Box::new(move |x| checked(expr_fn(x)?.sin()))
            }
            Expr::cos(expr) => {
                let expr_fn = expr.lambdify_checked(var)?;
                Box::new(move |x| checked(expr_fn(x)?.cos()))
            }
            Expr::tg(expr) => {
                let expr_fn = expr.lambdify_checked(var)?;
                Box::new(move |x| {
                    let arg = expr_fn(x)?;
                    if arg.cos() == 0.0 {
                        return Err(PointFailure::DivisionByZero);
                    }
                    checked(arg.tan())
                })
            }
            Expr::arcsin(expr) => {
                let expr_fn = expr.lambdify_checked(var)?;
                Box::new(move |x| {
                    let arg = expr_fn(x)?;
                    if arg.abs() > 1.0 {
                        return Err(PointFailure::OutOfInverseTrigRange);
                    }
                    checked(arg.asin())
                })
            }
            Expr::arccos(expr) => {
                let expr_fn = expr.lambdify_checked(var)?;
                Box::new(move |x| {
                    let arg = expr_fn(x)?;
                    if arg.abs() > 1.0 {
                        return Err(PointFailure::OutOfInverseTrigRange);
                    }
                    checked(arg.acos())
                })
            }
            Expr::arctg(expr) => {
                let expr_fn = expr.lambdify_checked(var)?;
                Box::new(move |x| checked(expr_fn(x)?.atan()))
            }
            Expr::Abs(expr) => {
                let expr_fn = expr.lambdify_checked(var)?;
                Box::new(move |x| Ok(expr_fn(x)?.abs()))
            }
        }; // end of match
        Ok(func)
    }
}
