use crate::errors::{PointFailure, RootFindingError};
use crate::symbolic::symbolic_lambdify::NumericCallable;
use log::{debug, trace};

//////////////////////////////////TRAITS AND IMPLEMENTATIONS/////////////////////////////////

/// Trait for representing a scalar equation f(x) = 0 whose evaluation may fail at a point
pub trait NonlinearFunction {
    /// Evaluate the function at point x
    fn evaluate(&self, x: f64) -> Result<f64, PointFailure>;

    /// Get function name for debugging/logging
    fn name(&self) -> &str {
        "unnamed_function"
    }
}

/// Simple function wrapper for closures that never fail
pub struct ClosureFunction<F>
where
    F: Fn(f64) -> f64,
{
    func: F,
    name: String,
}

impl<F> ClosureFunction<F>
where
    F: Fn(f64) -> f64,
{
    pub fn new(func: F, name: String) -> Self {
        Self { func, name }
    }
}

impl<F> NonlinearFunction for ClosureFunction<F>
where
    F: Fn(f64) -> f64,
{
    fn evaluate(&self, x: f64) -> Result<f64, PointFailure> {
        Ok((self.func)(x))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl NonlinearFunction for NumericCallable {
    fn evaluate(&self, x: f64) -> Result<f64, PointFailure> {
        NumericCallable::evaluate(self, x)
    }

    fn name(&self) -> &str {
        self.source()
    }
}

///////////////////////////////////////////SETTERS AND GETTERS///////////////////////////////////////////
/// Result structure for the bracketing refinement
#[derive(Debug, Clone, PartialEq)]
pub struct RootFindingResult {
    pub root: f64,
    pub function_value: f64,
    pub iterations: usize,
    pub converged: bool,
    pub method: String,
}

/// Configuration for the bracketing refinement
#[derive(Debug, Clone, PartialEq)]
pub struct RootFindingConfig {
    pub tolerance: f64,
    pub max_iterations: usize,
    /// log every iteration at trace level
    pub verbose: bool,
}

impl Default for RootFindingConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 50,
            verbose: false,
        }
    }
}

/// Bracketing root finder for scalar functions
pub struct ScalarRootFinder {
    config: RootFindingConfig,
}

impl Default for ScalarRootFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScalarRootFinder {
    /// Create a new ScalarRootFinder with default configuration
    pub fn new() -> Self {
        Self {
            config: RootFindingConfig::default(),
        }
    }

    /// Create a new ScalarRootFinder with custom configuration
    pub fn with_config(config: RootFindingConfig) -> Self {
        Self { config }
    }

    /// Set tolerance for convergence
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.config.tolerance = tolerance;
    }

    /// Set maximum number of iterations
    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.config.max_iterations = max_iterations;
    }

    /// Enable or disable per-iteration logging
    pub fn set_verbose(&mut self, verbose: bool) {
        self.config.verbose = verbose;
    }

    pub fn config(&self) -> &RootFindingConfig {
        &self.config
    }

    fn converged(&self, root: f64, function_value: f64, iterations: usize) -> RootFindingResult {
        RootFindingResult {
            root,
            function_value,
            iterations,
            converged: true,
            method: "bisection".to_string(),
        }
    }

    /////////////////////////////////////////METHODS///////////////////////////////////////////

    /// Bisection method for finding roots.
    /// Requires finite f(a), f(b) of opposite signs. Stops when |f(c)| or the half-width of
    /// the bracket drops below the tolerance.
    pub fn bisection<F>(
        &self,
        function: &F,
        mut a: f64,
        mut b: f64,
    ) -> Result<RootFindingResult, RootFindingError>
    where
        F: NonlinearFunction,
    {
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }

        let mut fa = function.evaluate(a)?;
        let fb = function.evaluate(b)?;
        if !fa.is_finite() {
            return Err(RootFindingError::NonFiniteEndpoint(a));
        }
        if !fb.is_finite() {
            return Err(RootFindingError::NonFiniteEndpoint(b));
        }

        // Check if the function values have opposite signs
        if fa * fb > 0.0 {
            return Err(RootFindingError::InvalidInterval);
        }

        // Check if we already have a root at the endpoints
        if fa.abs() < self.config.tolerance {
            return Ok(self.converged(a, fa, 0));
        }
        if fb.abs() < self.config.tolerance {
            return Ok(self.converged(b, fb, 0));
        }

        debug!(
            "bisection for {} on [{}, {}], tolerance {}",
            function.name(),
            a,
            b,
            self.config.tolerance
        );

        for iteration in 0..self.config.max_iterations {
            let c = 0.5 * (a + b);
            let fc = function.evaluate(c)?;

            if self.config.verbose {
                trace!(
                    "iteration {}: x = {:.10}, f(x) = {:.2e}, interval = [{:.6}, {:.6}]",
                    iteration + 1,
                    c,
                    fc,
                    a,
                    b
                );
            }

            if fc.abs() < self.config.tolerance || 0.5 * (b - a) < self.config.tolerance {
                return Ok(self.converged(c, fc, iteration + 1));
            }

            // keep the half where the sign changes
            if fa * fc < 0.0 {
                b = c;
            } else {
                a = c;
                fa = fc;
            }
        }

        Err(RootFindingError::MaxIterationsReached(self.config.max_iterations))
    }
}

/// Convenience wrapper: root of a plain closure on [a, b]
pub fn bisection<F>(function: F, a: f64, b: f64, tolerance: f64) -> Result<f64, RootFindingError>
where
    F: Fn(f64) -> f64,
{
    let func = ClosureFunction::new(function, "bisection_function".to_string());
    let mut solver = ScalarRootFinder::new();
    solver.set_tolerance(tolerance);
    let result = solver.bisection(&func, a, b)?;
    Ok(result.root)
}
