//! # Symbolic Engine Module
//!
//! Expression tree for real functions of one variable. The tree is the single
//! representation shared by every analysis: the normalizer produces it, the numeric
//! lowering walks it, the exact solver inverts it and the domain analyzer scans it
//! for structural constraints.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)`
//! - **Constants**: `Const(f64)` and the named constants `Pi`, `E`
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow`
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, `tg`, `arcsin`, `arccos`, `arctg`, `Abs`
//!
//! Square roots are stored as `Pow(base, Const(0.5))` and printed back as `sqrt(base)`.
//! Trigonometric nodes keep the mathematical notation (`tg`, `arctg`).

#![allow(non_camel_case_types)]

use std::collections::BTreeSet;
use std::f64::consts::{E, PI};
use std::fmt;

/// Core symbolic expression enum, an abstract syntax tree over one real variable.
///
/// # Examples
/// ```rust, ignore
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// The constant π
    Pi,
    /// Euler's number e
    E,
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    /// Sine function: sin(x)
    sin(Box<Expr>),
    /// Cosine function: cos(x)
    cos(Box<Expr>),
    /// Tangent function: tan(x) - uses mathematical notation 'tg'
    tg(Box<Expr>),
    /// Arcsine function: arcsin(x)
    arcsin(Box<Expr>),
    /// Arccosine function: arccos(x)
    arccos(Box<Expr>),
    /// Arctangent function: arctan(x) - uses mathematical notation 'arctg'
    arctg(Box<Expr>),
    /// Absolute value: |x|
    Abs(Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Pi => write!(f, "pi"),
            Expr::E => write!(f, "e"),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) if exp.is_sqrt_exponent() => write!(f, "sqrt({})", base),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tg({})", expr),
            Expr::arcsin(expr) => write!(f, "arcsin({})", expr),
            Expr::arccos(expr) => write!(f, "arccos({})", expr),
            Expr::arctg(expr) => write!(f, "arctg({})", expr),
            Expr::Abs(expr) => write!(f, "abs({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            Expr::Const(val) => Expr::Const(-val),
            other => Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(other)),
        }
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// Creates square root as a power with exponent 1/2.
    pub fn sqrt(self) -> Expr {
        Expr::Pow(self.boxed(), Box::new(Expr::Const(0.5)))
    }

    /// Creates exponential function e^(self).
    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    /// Creates natural logarithm ln(self).
    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    /// Checks if expression is exactly zero (constant 0.0).
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    fn is_sqrt_exponent(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.5)
    }

    /// Printed form without the parentheses around the outermost operation.
    pub fn to_plain_string(&self) -> String {
        let text = self.to_string();
        match self {
            Expr::Pow(_, exp) if exp.is_sqrt_exponent() => text,
            Expr::Add(..) | Expr::Sub(..) | Expr::Mul(..) | Expr::Div(..) | Expr::Pow(..) => {
                text[1..text.len() - 1].to_string()
            }
            _ => text,
        }
    }

    /// Immediate subexpressions of this node, left to right.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Var(_) | Expr::Const(_) | Expr::Pi | Expr::E => Vec::new(),
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::sin(expr)
            | Expr::cos(expr)
            | Expr::tg(expr)
            | Expr::arcsin(expr)
            | Expr::arccos(expr)
            | Expr::arctg(expr)
            | Expr::Abs(expr) => vec![expr.as_ref()],
        }
    }

    /// Rebuilds the node with every child mapped through `f`.
    pub fn map_children<F>(&self, mut f: F) -> Expr
    where
        F: FnMut(&Expr) -> Expr,
    {
        match self {
            Expr::Var(_) | Expr::Const(_) | Expr::Pi | Expr::E => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Mul(lhs, rhs) => Expr::Mul(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Div(lhs, rhs) => Expr::Div(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Pow(base, exp) => Expr::Pow(Box::new(f(base)), Box::new(f(exp))),
            Expr::Exp(expr) => Expr::Exp(Box::new(f(expr))),
            Expr::Ln(expr) => Expr::Ln(Box::new(f(expr))),
            Expr::sin(expr) => Expr::sin(Box::new(f(expr))),
            Expr::cos(expr) => Expr::cos(Box::new(f(expr))),
            Expr::tg(expr) => Expr::tg(Box::new(f(expr))),
            Expr::arcsin(expr) => Expr::arcsin(Box::new(f(expr))),
            Expr::arccos(expr) => Expr::arccos(Box::new(f(expr))),
            Expr::arctg(expr) => Expr::arctg(Box::new(f(expr))),
            Expr::Abs(expr) => Expr::Abs(Box::new(f(expr))),
        }
    }

    /// Depth-first, pre-order visit of every node.
    pub fn walk<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a Expr),
    {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Substitutes a variable with a constant value throughout the expression.
    pub fn set_variable(&self, var: &str, value: f64) -> Expr {
        self.substitute_variable(var, &Expr::Const(value))
    }

    /// substitute a variable with an expression
    pub fn substitute_variable(&self, var: &str, expr: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => expr.clone(),
            _ => self.map_children(|child| child.substitute_variable(var, expr)),
        }
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            _ => self
                .children()
                .into_iter()
                .any(|child| child.contains_variable(var_name)),
        }
    }

    /// Number of leaves equal to `var_name`.
    pub fn occurrences(&self, var_name: &str) -> usize {
        match self {
            Expr::Var(name) if name == var_name => 1,
            _ => self
                .children()
                .into_iter()
                .map(|child| child.occurrences(var_name))
                .sum(),
        }
    }

    /// Sorted set of all variable names in the expression.
    pub fn extract_variables(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        self.walk(&mut |node| {
            if let Expr::Var(name) = node {
                vars.insert(name.clone());
            }
        });
        vars
    }

    /// True when the expression has no variables at all.
    pub fn is_constant(&self) -> bool {
        self.extract_variables().is_empty()
    }

    /// Plain numeric value of a variable-free expression, without domain checks.
    ///
    /// Returns `None` when the expression has variables or the value is not finite.
    pub fn constant_value(&self) -> Option<f64> {
        let value = match self {
            Expr::Var(_) => return None,
            Expr::Const(val) => *val,
            Expr::Pi => PI,
            Expr::E => E,
            Expr::Add(lhs, rhs) => lhs.constant_value()? + rhs.constant_value()?,
            Expr::Sub(lhs, rhs) => lhs.constant_value()? - rhs.constant_value()?,
            Expr::Mul(lhs, rhs) => lhs.constant_value()? * rhs.constant_value()?,
            Expr::Div(lhs, rhs) => lhs.constant_value()? / rhs.constant_value()?,
            Expr::Pow(base, exp) => crate::symbolic::utils::real_powf(
                base.constant_value()?,
                exp.constant_value()?,
            ),
            Expr::Exp(expr) => expr.constant_value()?.exp(),
            Expr::Ln(expr) => expr.constant_value()?.ln(),
            Expr::sin(expr) => expr.constant_value()?.sin(),
            Expr::cos(expr) => expr.constant_value()?.cos(),
            Expr::tg(expr) => expr.constant_value()?.tan(),
            Expr::arcsin(expr) => expr.constant_value()?.asin(),
            Expr::arccos(expr) => expr.constant_value()?.acos(),
            Expr::arctg(expr) => expr.constant_value()?.atan(),
            Expr::Abs(expr) => expr.constant_value()?.abs(),
        };
        if value.is_finite() { Some(value) } else { None }
    }
}
