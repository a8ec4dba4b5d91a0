#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// Expression normalizer: turns raw function text into a validated single-variable expression
///
///# Example
/// ```
/// use RustedFuncAnalysis::symbolic::parse_expr::normalize;
/// let expr = normalize("2x^2 - |x| + 3,5").unwrap();
/// println!("normalized: {}", expr);
/// assert!(normalize("x = 2").is_err());
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// the expression tree shared by every analysis:
/// 1) built by the normalizer
/// 2) printed back as a parenthesized string that parses to the same tree
/// 3) walked by the numeric lowering, the solver, the limit and the image modules
///# Example#
/// ```
/// use RustedFuncAnalysis::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let f = x.clone().pow(Expr::Const(2.0)) - Expr::Const(4.0);
/// println!("f = {}", f);
/// assert_eq!(f.set_variable("x", 3.0).constant_value(), Some(5.0));
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
/// immutable validated expression with its own variable name
pub mod expression;
/// constant folding and algebraic identities
pub mod symbolic_simplify;
///______________________________________________________________________________________________________________________________________________
/// lowering to checked numeric closures
/// Example#
/// ```
/// use RustedFuncAnalysis::symbolic::parse_expr::normalize;
/// use RustedFuncAnalysis::symbolic::symbolic_lambdify::compile;
/// let f = compile(&normalize("1/x").unwrap()).unwrap();
/// assert_eq!(f.evaluate(4.0), Ok(0.25));
/// assert!(f.evaluate(0.0).is_err());
/// ```
pub mod symbolic_lambdify;
/// dense polynomials and rational functions, real roots via companion matrix
pub mod polynomial;
/// unions of real intervals
pub mod real_sets;
/// exact real solving of equations and sign conditions
pub mod symbolic_solve;
/// limits at ±∞ and at finite poles
pub mod symbolic_limits;
/// exact image of the domain through single-occurrence expressions
pub mod symbolic_image;
///______________________________________________________________________________________________________________________________________________
/// the collection of small numeric helpers: fractions, real roots, rounding and printing
/// _____________________________________________________________________________________________________________________________________________
pub mod utils;
