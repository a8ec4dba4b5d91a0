// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
//! # RustedFuncAnalysis
//! Analysis of real functions of one variable given as text: normalization into an
//! expression tree, natural domain with justification, range, axis intersections,
//! value at a point with a derivation trail, and plot samples.
//! ```
//! use RustedFuncAnalysis::{AnalysisConfig, analyze};
//! let report = analyze("1/x", &AnalysisConfig::default()).unwrap();
//! assert!(report.intersections.x_roots.is_empty());
//! println!("{}", report);
//! ```
pub mod Examples;
pub mod Utils;
pub mod analysis;
pub mod errors;
pub mod numerical;
pub mod symbolic;

pub use analysis::config::AnalysisConfig;
pub use analysis::domain::{DomainResult, analyze_domain};
pub use analysis::intersections::{Intersections, find_intersections};
pub use analysis::point_eval::{PointEvaluation, evaluate_at};
pub use analysis::range::{RangeResult, estimate_range};
pub use analysis::report::{FunctionReport, analyze, analyze_parallel};
pub use errors::{AnalysisError, CompileError, ConfigError, ParseError, PointFailure};
pub use numerical::sampling::sample;
pub use symbolic::expression::Expression;
pub use symbolic::parse_expr::normalize;
pub use symbolic::symbolic_lambdify::compile;
