//! Error taxonomy of the analysis pipeline.
//!
//! Only [`ParseError`] and [`CompileError`] abort an analysis. [`PointFailure`] and
//! [`SolverInconclusive`] are recovered where they occur: a failing point is skipped or
//! reported as NaN, an inconclusive exact step hands over to the next, weaker method.
use thiserror::Error;

/// The text could not be turned into a valid single-variable real expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("the function cannot be empty")]
    Empty,
    #[error("the function cannot contain equalities ('=')")]
    ContainsEquality,
    #[error("unbalanced or nested absolute value bars '|'")]
    UnbalancedPipes,
    #[error("invalid expression near '{near}' (position {position})")]
    Syntax { position: usize, near: String },
    #[error("the function may only contain the variable '{expected}', found: {found:?}")]
    ForeignVariables { expected: String, found: Vec<String> },
    #[error("the function cannot be zero")]
    ZeroFunction,
    #[error("the function cannot contain infinities or divisions by zero")]
    InfiniteConstant,
    #[error("the value to evaluate must be a real number, got '{0}'")]
    NotARealNumber(String),
}

/// A syntactically valid expression could not be lowered into a numeric callable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("cannot lower expression: unknown variable '{found}' (callable is over '{declared}')")]
    UnknownVariable { declared: String, found: String },
    #[error("cannot lower expression: non-finite constant {0}")]
    NonFiniteConstant(f64),
}

/// Per-point numeric failure of a compiled callable.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PointFailure {
    #[error("division by zero")]
    DivisionByZero,
    #[error("negative radicand of an even root")]
    NegativeEvenRoot,
    #[error("non-positive argument of a logarithm")]
    NonPositiveLog,
    #[error("argument of an inverse trigonometric function outside [-1, 1]")]
    OutOfInverseTrigRange,
    #[error("numeric overflow")]
    Overflow,
    #[error("the result is not a real number")]
    NotReal,
}

/// An exact symbolic step could not give a definitive answer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverInconclusive {
    #[error("the solution set is infinite")]
    InfiniteSolutionSet,
    #[error("the equation holds for every real number")]
    AllReals,
    #[error("unsupported construct: {0}")]
    Unsupported(String),
}

/// Hard failures surfaced to the caller of a full analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Preconditions or convergence failures of the bracketing root finder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RootFindingError {
    #[error("invalid interval for bisection: f(a) and f(b) have the same sign")]
    InvalidInterval,
    #[error("non-finite function value at the bracket end {0}")]
    NonFiniteEndpoint(f64),
    #[error("maximum iterations reached ({0})")]
    MaxIterationsReached(usize),
    #[error("evaluation failed inside the bracket: {0}")]
    Point(#[from] PointFailure),
}

/// A settings document could not be read or applied.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings document near '{0}'")]
    Syntax(String),
    #[error("unknown settings section '{0}'")]
    UnknownSection(String),
    #[error("unknown key '{key}' in section '{section}'")]
    UnknownKey { section: String, key: String },
    #[error("bad value for '{section}.{key}': {reason}")]
    BadValue {
        section: String,
        key: String,
        reason: String,
    },
    #[error("unknown log level '{0}' (expected debug, info, warn, error or off)")]
    UnknownLogLevel(String),
}
