//! Natural domain of an expression, derived from its structure.
//!
//! Starting from ℝ, every structural constraint is visited in a fixed order
//! (tangent singularities, denominators, even roots, logarithms, inverse trigonometric
//! arguments, powers with a variable exponent). A constraint the exact solver can settle restricts the domain; one it
//! cannot settle is reported as text and left unenforced.
use crate::errors::SolverInconclusive;
use crate::symbolic::expression::Expression;
use crate::symbolic::real_sets::RealSet;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_solve::{Inequality, solve_equation, solve_inequality};
use crate::symbolic::utils::format_number;
use log::{debug, info};
use strum_macros::Display;

/// What kind of structure produced a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ConstraintKind {
    #[strum(serialize = "tangent singularity")]
    Singularity,
    #[strum(serialize = "denominator")]
    Denominator,
    #[strum(serialize = "even root")]
    EvenRoot,
    #[strum(serialize = "logarithm")]
    Logarithm,
    #[strum(serialize = "inverse trigonometric")]
    InverseTrig,
    /// `base^exponent` with the variable on both sides, defined as exp(exponent·ln(base))
    #[strum(serialize = "variable exponent")]
    VariableExponent,
}

/// One structural requirement on the variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    /// the node that imposes the requirement
    pub source: Expr,
    /// the set allowed by the requirement; `None` when it could not be solved exactly
    pub allowed: Option<RealSet>,
}

/// Admissible inputs and the justification trail.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainResult {
    pub domain: RealSet,
    pub constraints: Vec<Constraint>,
    pub steps: Vec<String>,
}

impl DomainResult {
    /// Constraints that are stated but not enforced on `domain`.
    pub fn unresolved(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.allowed.is_none())
    }
}

/// Derives the natural domain of `expr`. Never fails: unsolved constraints become text.
pub fn analyze_domain(expr: &Expression) -> DomainResult {
    let mut builder = DomainBuilder::new(expr.variable());
    let tree = expr.tree();

    for node in nodes(tree, expr.variable(), |n| matches!(n, Expr::tg(_))) {
        if let Expr::tg(arg) = node {
            builder.tangent(node, arg);
        }
    }
    for den in expr.denominators() {
        builder.denominator(&den);
    }
    for node in expr.radicals() {
        if let Expr::Pow(base, _) = node {
            if base.contains_variable(expr.variable()) {
                builder.even_root(node, base);
            }
        }
    }
    for node in expr.logarithms() {
        if let Expr::Ln(arg) = node {
            if arg.contains_variable(expr.variable()) {
                builder.logarithm(node, arg);
            }
        }
    }
    for node in expr.inverse_trig() {
        if let Expr::arcsin(arg) | Expr::arccos(arg) = node {
            if arg.contains_variable(expr.variable()) {
                builder.inverse_trig(node, arg);
            }
        }
    }
    for node in expr.powers() {
        if let Expr::Pow(base, exp) = node {
            if base.contains_variable(expr.variable()) && exp.contains_variable(expr.variable()) {
                builder.variable_exponent(node, base);
            }
        }
    }
    builder.finish(expr)
}

/// Distinct nodes matching `predicate` whose subtree depends on `var`, in pre-order.
fn nodes<'a>(tree: &'a Expr, var: &str, predicate: impl Fn(&Expr) -> bool) -> Vec<&'a Expr> {
    let mut found: Vec<&Expr> = Vec::new();
    tree.walk(&mut |node| {
        if predicate(node) && node.contains_variable(var) && !found.contains(&node) {
            found.push(node);
        }
    });
    found
}

struct DomainBuilder<'a> {
    var: &'a str,
    domain: RealSet,
    constraints: Vec<Constraint>,
    steps: Vec<String>,
}

impl<'a> DomainBuilder<'a> {
    fn new(var: &'a str) -> Self {
        Self {
            var,
            domain: RealSet::all(),
            constraints: Vec::new(),
            steps: Vec::new(),
        }
    }

    fn record(&mut self, kind: ConstraintKind, source: &Expr, allowed: Option<RealSet>) {
        if let Some(allowed) = &allowed {
            self.domain = self.domain.intersect(allowed);
        }
        self.constraints.push(Constraint {
            kind,
            source: source.clone(),
            allowed,
        });
    }

    fn tangent(&mut self, node: &Expr, arg: &Expr) {
        let cosine = Expr::cos(Box::new(arg.clone()));
        let allowed = match solve_equation(&cosine, self.var) {
            Ok(points) if !points.is_empty() => {
                self.steps.push(format!(
                    "Remove {} because cos({}) = 0 there and {} is undefined.",
                    list(self.var, &points),
                    arg.to_plain_string(),
                    node
                ));
                Some(RealSet::all().exclude_points(&points))
            }
            Ok(_) => {
                self.steps.push(format!(
                    "cos({}) is never zero, so {} has no poles.",
                    arg.to_plain_string(),
                    node
                ));
                Some(RealSet::all())
            }
            Err(reason) => {
                debug!("tangent poles of {}: {}", node, reason);
                self.steps.push(format!(
                    "Requires cos({}) ≠ 0 because of {} (its poles are π/2 + kπ).",
                    arg.to_plain_string(),
                    node
                ));
                None
            }
        };
        self.record(ConstraintKind::Singularity, node, allowed);
    }

    fn denominator(&mut self, den: &Expr) {
        let allowed = match solve_equation(den, self.var) {
            Ok(points) if points.is_empty() => {
                self.steps.push(format!(
                    "The denominator {} is never zero.",
                    den.to_plain_string()
                ));
                Some(RealSet::all())
            }
            Ok(points) => {
                self.steps.push(format!(
                    "Remove {} because it makes the denominator {} zero.",
                    list(self.var, &points),
                    den.to_plain_string()
                ));
                Some(RealSet::all().exclude_points(&points))
            }
            Err(SolverInconclusive::AllReals) => {
                self.steps.push(format!(
                    "The denominator {} is zero for every x; the function is nowhere defined.",
                    den.to_plain_string()
                ));
                Some(RealSet::empty())
            }
            Err(reason) => {
                debug!("denominator {} unresolved: {}", den, reason);
                self.steps
                    .push(format!("Requires {} ≠ 0.", den.to_plain_string()));
                None
            }
        };
        self.record(ConstraintKind::Denominator, den, allowed);
    }

    fn even_root(&mut self, node: &Expr, base: &Expr) {
        let allowed = self.solve(base, Inequality::NonNegative);
        let root = match node {
            Expr::Pow(_, exp) if exp.constant_value() == Some(0.5) => "the square root".to_string(),
            _ => format!("the even root {}", node),
        };
        self.steps.push(format!(
            "Requires {} ≥ 0 because of {}{}.",
            base.to_plain_string(),
            root,
            solved_suffix(self.var, &allowed)
        ));
        self.record(ConstraintKind::EvenRoot, node, allowed);
    }

    fn logarithm(&mut self, node: &Expr, arg: &Expr) {
        let allowed = self.solve(arg, Inequality::Positive);
        self.steps.push(format!(
            "Requires {} > 0 because of {}{}.",
            arg.to_plain_string(),
            node,
            solved_suffix(self.var, &allowed)
        ));
        self.record(ConstraintKind::Logarithm, node, allowed);
    }

    fn inverse_trig(&mut self, node: &Expr, arg: &Expr) {
        let above = arg.clone() + Expr::Const(1.0);
        let below = Expr::Const(1.0) - arg.clone();
        let allowed = match (
            self.solve(&above, Inequality::NonNegative),
            self.solve(&below, Inequality::NonNegative),
        ) {
            (Some(a), Some(b)) => Some(a.intersect(&b)),
            _ => None,
        };
        self.steps.push(format!(
            "Requires -1 ≤ {} ≤ 1 because of {}{}.",
            arg.to_plain_string(),
            node,
            solved_suffix(self.var, &allowed)
        ));
        self.record(ConstraintKind::InverseTrig, node, allowed);
    }

    fn variable_exponent(&mut self, node: &Expr, base: &Expr) {
        let allowed = self.solve(base, Inequality::Positive);
        self.steps.push(format!(
            "Requires {} > 0 because {} has a variable exponent{}.",
            base.to_plain_string(),
            node,
            solved_suffix(self.var, &allowed)
        ));
        self.record(ConstraintKind::VariableExponent, node, allowed);
    }

    fn solve(&self, g: &Expr, relation: Inequality) -> Option<RealSet> {
        match solve_inequality(g, self.var, relation) {
            Ok(set) => Some(set),
            Err(reason) => {
                debug!("inequality on {} unresolved: {}", g, reason);
                None
            }
        }
    }

    fn finish(mut self, expr: &Expression) -> DomainResult {
        if self.constraints.is_empty() {
            self.steps
                .push("The function is defined for all real numbers.".to_string());
        }
        let unresolved = self.constraints.iter().filter(|c| c.allowed.is_none()).count();
        info!(
            "domain of {}: {} ({} constraint(s), {} unresolved)",
            expr,
            self.domain,
            self.constraints.len(),
            unresolved
        );
        DomainResult {
            domain: self.domain,
            constraints: self.constraints,
            steps: self.steps,
        }
    }
}

fn list(var: &str, points: &[f64]) -> String {
    let shown: Vec<String> = points.iter().map(|p| format_number(*p)).collect();
    format!("{} = {}", var, shown.join(", "))
}

fn solved_suffix(var: &str, allowed: &Option<RealSet>) -> String {
    match allowed {
        Some(set) => format!(": {} ∈ {}", var, set),
        None => " (could not be solved exactly; not enforced)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::{normalize, normalize_in};

    fn domain_of(text: &str) -> DomainResult {
        analyze_domain(&normalize(text).unwrap())
    }

    #[test]
    fn test_polynomial_is_defined_everywhere() {
        let result = domain_of("x^2 - 4");
        assert!(result.domain.is_all());
        assert_eq!(
            result.steps,
            vec!["The function is defined for all real numbers.".to_string()]
        );
        assert!(result.constraints.is_empty());
    }

    #[test]
    fn test_reciprocal_excludes_zero() {
        let result = domain_of("1/x");
        assert_eq!(result.domain.to_string(), "ℝ \\ {0}");
        assert_eq!(result.constraints.len(), 1);
        assert_eq!(result.constraints[0].kind, ConstraintKind::Denominator);
        assert!(result.steps[0].contains("x = 0"));
    }

    #[test]
    fn test_square_root_and_logarithm() {
        assert_eq!(domain_of("sqrt(x)").domain.to_string(), "[0, ∞)");
        let log = domain_of("log(x - 1)");
        assert_eq!(log.domain.to_string(), "(1, ∞)");
        assert!(!log.domain.contains(1.0));
        assert!(log.steps[0].starts_with("Requires x - 1 > 0"));
        assert_eq!(domain_of("sqrt(4 - x^2)").domain.to_string(), "[-2, 2]");
        assert_eq!(domain_of("ln(x) + sqrt(x - 2)").domain.to_string(), "[2, ∞)");
    }

    #[test]
    fn test_inverse_trig_and_rational() {
        assert_eq!(domain_of("arcsin(2x)").domain.to_string(), "[-0.5, 0.5]");
        let rational = domain_of("(x + 1)/(x^2 - 1)");
        assert_eq!(rational.domain.to_string(), "ℝ \\ {-1, 1}");
        assert_eq!(domain_of("1/(x^2 + 1)").domain.to_string(), "ℝ");
        assert_eq!(domain_of("x^(-1/2)").domain.to_string(), "(0, ∞)");
    }

    #[test]
    fn test_variable_exponent_needs_positive_base() {
        let result = domain_of("x^x");
        assert_eq!(result.domain.to_string(), "(0, ∞)");
        assert_eq!(result.constraints.len(), 1);
        assert_eq!(result.constraints[0].kind, ConstraintKind::VariableExponent);
        assert!(result.steps[0].starts_with("Requires x > 0"));
        assert_eq!(domain_of("(x - 1)^(2x)").domain.to_string(), "(1, ∞)");
        // constant base or constant exponent: no extra constraint
        assert!(domain_of("2^x").domain.is_all());
        assert!(domain_of("x^3").domain.is_all());
    }

    #[test]
    fn test_steps_name_the_variable() {
        let expr = normalize_in("ln(t - 1)", "t").unwrap();
        let result = analyze_domain(&expr);
        assert_eq!(result.domain.to_string(), "(1, ∞)");
        assert!(result.steps[0].ends_with(": t ∈ (1, ∞)."), "{:?}", result.steps);
        assert!(!result.steps[0].contains("x ∈"));
    }

    #[test]
    fn test_unresolved_constraints_are_stated_not_enforced() {
        let result = domain_of("1/sin(x)");
        assert!(result.domain.is_all());
        assert_eq!(result.unresolved().count(), 1);
        assert_eq!(result.steps, vec!["Requires sin(x) ≠ 0.".to_string()]);

        let tangent = domain_of("tan(x)");
        assert!(tangent.domain.is_all());
        assert_eq!(tangent.constraints[0].kind, ConstraintKind::Singularity);
        assert!(tangent.steps[0].contains("π/2 + kπ"));
    }

    #[test]
    fn test_constraint_order_and_purity() {
        let expr = normalize("sqrt(x)/ (x - 4) + ln(x + 1)").unwrap();
        let first = analyze_domain(&expr);
        let kinds: Vec<ConstraintKind> = first.constraints.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ConstraintKind::Denominator,
                ConstraintKind::EvenRoot,
                ConstraintKind::Logarithm
            ]
        );
        assert_eq!(first.domain.to_string(), "[0, 4) ∪ (4, ∞)");
        assert_eq!(first, analyze_domain(&expr));
        assert_eq!(ConstraintKind::EvenRoot.to_string(), "even root");
    }
}
