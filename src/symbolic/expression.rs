//! The immutable, validated expression handed to every analysis.
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::is_even_root_exponent;
use std::collections::BTreeSet;
use std::fmt;

/// default name of the free variable
pub const DEFAULT_VARIABLE: &str = "x";

/// A symbolic tree over one declared real variable.
///
/// The free-variable set of the tree is either empty or exactly `{variable}`; the
/// normalizer refuses to build anything else. The expression carries its own variable
/// name, so no analysis depends on a process-wide symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    tree: Expr,
    variable: String,
    source: String,
}

impl Expression {
    pub(crate) fn new(tree: Expr, variable: &str, source: &str) -> Self {
        Self {
            tree,
            variable: variable.to_string(),
            source: source.to_string(),
        }
    }

    pub fn tree(&self) -> &Expr {
        &self.tree
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// The text the expression was normalized from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn free_variables(&self) -> BTreeSet<String> {
        self.tree.extract_variables()
    }

    pub fn is_constant(&self) -> bool {
        !self.tree.contains_variable(&self.variable)
    }

    /// Power nodes whose exponent is a fraction with an even denominator (radicals).
    pub fn radicals(&self) -> Vec<&Expr> {
        self.atoms(|node| match node {
            Expr::Pow(_, exp) => exp.constant_value().is_some_and(is_even_root_exponent),
            _ => false,
        })
    }

    /// Every power node.
    pub fn powers(&self) -> Vec<&Expr> {
        self.atoms(|node| matches!(node, Expr::Pow(_, _)))
    }

    pub fn logarithms(&self) -> Vec<&Expr> {
        self.atoms(|node| matches!(node, Expr::Ln(_)))
    }

    pub fn inverse_trig(&self) -> Vec<&Expr> {
        self.atoms(|node| matches!(node, Expr::arcsin(_) | Expr::arccos(_)))
    }

    /// Denominator subexpressions that depend on the variable: right operands of
    /// divisions and bases raised to negative powers.
    pub fn denominators(&self) -> Vec<Expr> {
        let mut found: Vec<Expr> = Vec::new();
        self.tree.walk(&mut |node| {
            let candidate = match node {
                Expr::Div(_, rhs) => Some(rhs.as_ref().clone()),
                Expr::Pow(base, exp) if exp.constant_value().is_some_and(|e| e < 0.0) => {
                    Some(base.as_ref().clone())
                }
                _ => None,
            };
            if let Some(den) = candidate {
                if den.contains_variable(&self.variable) && !found.contains(&den) {
                    found.push(den);
                }
            }
        });
        found
    }

    fn atoms<F>(&self, predicate: F) -> Vec<&Expr>
    where
        F: Fn(&Expr) -> bool,
    {
        let mut found: Vec<&Expr> = Vec::new();
        self.tree.walk(&mut |node| {
            if predicate(node) && !found.contains(&node) {
                found.push(node);
            }
        });
        found
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tree)
    }
}
