//! # Symbolic Expression Simplification Module
//!
//! Bottom-up rewriting of an [`Expr`] tree. Two families of rules are applied after the
//! children of a node have been simplified:
//!
//! 1. **Constant Folding**: arithmetic on numeric constants is evaluated whenever the
//!    result is finite; powers and elementary functions of constants are folded only when
//!    the result is an integer (`sqrt(4)` → `2`, `sin(0)` → `0`) so that `sqrt(2)` or
//!    `ln(3)` stay exact.
//! 2. **Algebraic Identities**: `a + 0`, `a - a`, `a * 1`, `0 * a`, `a / 1`, `a / a`,
//!    `a ^ 1`, `a ^ 0`, `1 ^ a`, nested constant factors and double negation.
//!
//! Simplification never changes where an expression is defined, except for the
//! cancellations `a - a`, `a / a` and `0 * a`, which are only applied when `a` is free of
//! divisions, logarithms and roots.
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::real_powf;

/// Closeness to an integer accepted when folding transcendental constants.
const INTEGER_TOLERANCE: f64 = 1e-12;

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// Simplifies the expression bottom-up until no rule applies at the root.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let x = Expr::Var("x".to_string());
    /// let expr = (x.clone() * Expr::Const(1.0)) + Expr::Const(0.0);
    /// assert_eq!(expr.simplify(), x);
    /// ```
    pub fn simplify(&self) -> Expr {
        let with_children = self.map_children(|child| child.simplify());
        with_children.simplify_node()
    }

    fn simplify_node(self) -> Expr {
        if let Some(folded) = self.fold_constants() {
            return folded;
        }
        match self {
            Expr::Add(lhs, rhs) => match (*lhs, *rhs) {
                (a, b) if b.is_zero() => a,
                (a, b) if a.is_zero() => b,
                (a, Expr::Const(c)) if c < 0.0 => Expr::Sub(a.boxed(), Expr::Const(-c).boxed()),
                (a, b) => Expr::Add(a.boxed(), b.boxed()),
            },
            Expr::Sub(lhs, rhs) => match (*lhs, *rhs) {
                (a, b) if b.is_zero() => a,
                (a, b) if a.is_zero() => (-b).simplify_node(),
                (a, b) if a == b && a.is_total() => Expr::Const(0.0),
                (a, b) => Expr::Sub(a.boxed(), b.boxed()),
            },
            Expr::Mul(lhs, rhs) => match (*lhs, *rhs) {
                (a, b) if (a.is_zero() && b.is_total()) || (b.is_zero() && a.is_total()) => {
                    Expr::Const(0.0)
                }
                (Expr::Const(c), b) if c == 1.0 => b,
                (a, Expr::Const(c)) if c == 1.0 => a,
                // constants gather on the left: c1 * (c2 * a) → (c1 c2) * a
                (Expr::Const(c1), Expr::Mul(inner_lhs, inner_rhs)) => match *inner_lhs {
                    Expr::Const(c2) => Expr::Mul(Expr::Const(c1 * c2).boxed(), inner_rhs)
                        .simplify_node(),
                    other => Expr::Mul(
                        Expr::Const(c1).boxed(),
                        Expr::Mul(other.boxed(), inner_rhs).boxed(),
                    ),
                },
                (a, Expr::Const(c)) => Expr::Mul(Expr::Const(c).boxed(), a.boxed()),
                (a, b) => Expr::Mul(a.boxed(), b.boxed()),
            },
            Expr::Div(lhs, rhs) => match (*lhs, *rhs) {
                (a, Expr::Const(c)) if c == 1.0 => a,
                (a, b) if a.is_zero() && b.is_total() && !b.is_zero() => Expr::Const(0.0),
                (a, b) if a == b && a.is_total() && !a.is_constant() => Expr::Const(1.0),
                (a, b) => Expr::Div(a.boxed(), b.boxed()),
            },
            Expr::Pow(base, exp) => match (*base, *exp) {
                (a, Expr::Const(c)) if c == 1.0 => a,
                (a, Expr::Const(c)) if c == 0.0 && a.is_total() => Expr::Const(1.0),
                (Expr::Const(c), _) if c == 1.0 => Expr::Const(1.0),
                (a, b) => Expr::Pow(a.boxed(), b.boxed()),
            },
            Expr::Ln(arg) if *arg == Expr::E => Expr::Const(1.0),
            Expr::Ln(arg) => match *arg {
                Expr::Exp(inner) => *inner,
                other => Expr::Ln(other.boxed()),
            },
            Expr::Abs(arg) => match *arg {
                Expr::Abs(inner) => Expr::Abs(inner),
                other => Expr::Abs(other.boxed()),
            },
            other => other,
        }
    }

    /// Folds a node whose children are all plain constants.
    fn fold_constants(&self) -> Option<Expr> {
        let children = self.children();
        if children.is_empty() || !children.iter().all(|c| matches!(c, Expr::Const(_))) {
            return None;
        }
        let value = match self {
            Expr::Add(..) | Expr::Sub(..) | Expr::Mul(..) | Expr::Div(..) | Expr::Abs(_) => {
                self.constant_value()?
            }
            Expr::Pow(base, exp) => {
                let (Expr::Const(b), Expr::Const(e)) = (base.as_ref(), exp.as_ref()) else {
                    return None;
                };
                let value = real_powf(*b, *e);
                if e.fract() == 0.0 && value.is_finite() {
                    value
                } else {
                    near_integer(value)?
                }
            }
            _ => near_integer(self.constant_value()?)?,
        };
        Some(Expr::Const(value))
    }

    /// Defined at every real point: no divisions, logarithms, inverse trig, tangents
    /// or fractional/negative powers.
    fn is_total(&self) -> bool {
        let mut total = true;
        self.walk(&mut |node| {
            total &= match node {
                Expr::Div(..) | Expr::Ln(_) | Expr::tg(_) | Expr::arcsin(_) | Expr::arccos(_) => {
                    false
                }
                Expr::Pow(_, exp) => {
                    matches!(exp.as_ref(), Expr::Const(e) if *e >= 0.0 && e.fract() == 0.0)
                }
                _ => true,
            };
        });
        total
    }
}

fn near_integer(value: f64) -> Option<f64> {
    let rounded = value.round();
    if value.is_finite() && (value - rounded).abs() < INTEGER_TOLERANCE {
        // no negative zero in folded output
        Some(if rounded == 0.0 { 0.0 } else { rounded })
    } else {
        None
    }
}
