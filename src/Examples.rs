//! examples of usage of RustedFuncAnalysis
/// Function analysis examples: report, domain, range, intercepts, point values, sampling
pub mod analysis_examples;
