//! Analyses of a normalized expression. Each one is pure over an immutable
//! [`Expression`](crate::symbolic::expression::Expression), so they can run in any order
//! or concurrently.
/// numeric settings with their defaults, loadable from a settings document
pub mod config;
///____________________________________________________________________________________________________________________________
/// # Domain
/// admissible inputs derived from denominators, even roots, logarithms, inverse trigonometric
/// arguments and tangent poles, with a justification line per constraint
///# Example#
/// ```
/// use RustedFuncAnalysis::{analyze_domain, normalize};
/// let result = analyze_domain(&normalize("log(x - 1)").unwrap());
/// assert_eq!(result.domain.to_string(), "(1, ∞)");
/// for step in &result.steps {
///     println!("{}", step);
/// }
/// ```
pub mod domain;
/// range: exact image, then limit analysis, then sampling
/// ```
/// use RustedFuncAnalysis::{estimate_range, normalize};
/// let range = estimate_range(&normalize("x^2 - 4").unwrap());
/// assert_eq!(range.to_string(), "[-4, ∞)");
/// ```
pub mod range;
/// axis intersections: exact roots first, sign-change scan with bisection otherwise
pub mod intersections;
/// value at one point with a derivation trail
pub mod point_eval;
/// everything together, as text and tables
pub mod report;
#[cfg(test)]
mod analysis_tests;
