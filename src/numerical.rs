/// Bracketing root finder (bisection) over functions whose evaluation may fail at a point
///  Example#1
/// ```
/// use RustedFuncAnalysis::numerical::bisection::{ClosureFunction, ScalarRootFinder};
/// let solver = ScalarRootFinder::new();
/// let func = ClosureFunction::new(|x| x * x - 4.0, "x^2 - 4".to_string());
/// let result = solver.bisection(&func, 0.0, 3.0).unwrap();
/// assert!((result.root - 2.0).abs() < 1e-6);
/// ```
pub mod bisection;
/// evenly spaced samples of a compiled function (curves for plotting, value tables)
/// Example#1
/// ```
/// use RustedFuncAnalysis::{compile, normalize, sample};
/// let f = compile(&normalize("sqrt(x)").unwrap()).unwrap();
/// let points = sample(&f, (-1.0, 1.0), 0.5);
/// assert!(points[0].1.is_nan());
/// assert_eq!(points[4], (1.0, 1.0));
/// ```
pub mod sampling;
/// sign-change scan of a window refined by bisection: numeric x-intercepts
pub mod root_scan;
