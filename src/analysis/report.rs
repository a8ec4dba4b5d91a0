//! The full analysis of one function and its text rendering.
use crate::analysis::config::AnalysisConfig;
use crate::analysis::domain::{DomainResult, analyze_domain};
use crate::analysis::intersections::{Intersections, RootMethod, find_intersections_with};
use crate::analysis::point_eval::{PointEvaluation, evaluate_at};
use crate::analysis::range::{RangeResult, estimate_range_with};
use crate::errors::AnalysisError;
use crate::numerical::sampling::{integer_table, sample};
use crate::symbolic::expression::Expression;
use crate::symbolic::parse_expr::normalize;
use crate::symbolic::symbolic_lambdify::compile;
use crate::symbolic::utils::format_number;
use log::info;
use std::fmt;
use std::time::Instant;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Everything shown for one function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionReport {
    pub expression: Expression,
    pub domain: DomainResult,
    pub range: RangeResult,
    pub intersections: Intersections,
    pub point: Option<PointEvaluation>,
    /// curve over the plot window, NaN where undefined
    pub samples: Vec<(f64, f64)>,
    /// values at the integers of the configured grid
    pub table: Vec<(i64, f64)>,
    max_listed_roots: usize,
}

#[derive(Tabled)]
struct InterceptRow {
    axis: &'static str,
    x: String,
    y: String,
}

#[derive(Tabled)]
struct ValueRow {
    x: i64,
    #[tabled(rename = "f(x)")]
    y: String,
}

/// Parses `text` and runs every analysis one after the other.
pub fn analyze(text: &str, config: &AnalysisConfig) -> Result<FunctionReport, AnalysisError> {
    let expr = normalize(text)?;
    let begin = Instant::now();
    let domain = analyze_domain(&expr);
    let range = estimate_range_with(&expr, &config.range);
    let intersections = find_intersections_with(&expr, &config.roots);
    let report = assemble(expr, domain, range, intersections, config)?;
    info!("analysis finished in {:?}", begin.elapsed());
    Ok(report)
}

/// Same as [`analyze`], with the domain, range and intersection analyses run concurrently.
pub fn analyze_parallel(
    text: &str,
    config: &AnalysisConfig,
) -> Result<FunctionReport, AnalysisError> {
    let expr = normalize(text)?;
    let begin = Instant::now();
    let (domain, (range, intersections)) = rayon::join(
        || analyze_domain(&expr),
        || {
            rayon::join(
                || estimate_range_with(&expr, &config.range),
                || find_intersections_with(&expr, &config.roots),
            )
        },
    );
    let report = assemble(expr, domain, range, intersections, config)?;
    info!("parallel analysis finished in {:?}", begin.elapsed());
    Ok(report)
}

fn assemble(
    expression: Expression,
    domain: DomainResult,
    range: RangeResult,
    intersections: Intersections,
    config: &AnalysisConfig,
) -> Result<FunctionReport, AnalysisError> {
    let callable = compile(&expression)?;
    let samples = sample(&callable, config.samples.window, config.samples.step);
    let table = integer_table(&callable, config.samples.grid);
    Ok(FunctionReport {
        expression,
        domain,
        range,
        intersections,
        point: None,
        samples,
        table,
        max_listed_roots: config.report.max_listed_roots,
    })
}

impl FunctionReport {
    /// Adds the evaluation at `point` to the report.
    pub fn with_point(mut self, point: f64) -> Self {
        self.point = Some(evaluate_at(&self.expression, point));
        self
    }

    /// Intercepts as a table: one row for the y-intercept, one per listed x-intercept.
    pub fn intercepts_table(&self) -> String {
        let mut rows = Vec::new();
        if !self.intersections.y0.is_nan() {
            rows.push(InterceptRow {
                axis: "y",
                x: "0".to_string(),
                y: format_number(self.intersections.y0),
            });
        }
        for root in self.listed_roots() {
            rows.push(InterceptRow {
                axis: "x",
                x: format_number(*root),
                y: "0".to_string(),
            });
        }
        let mut table = Table::new(&rows);
        table.with(Style::modern_rounded());
        table.to_string()
    }

    /// The integer-grid value table.
    pub fn values_table(&self) -> String {
        let rows: Vec<ValueRow> = self
            .table
            .iter()
            .map(|(x, y)| ValueRow {
                x: *x,
                y: if y.is_nan() {
                    "undefined".to_string()
                } else {
                    format_number(*y)
                },
            })
            .collect();
        let mut table = Table::new(&rows);
        table.with(Style::modern_rounded());
        table.to_string()
    }

    fn listed_roots(&self) -> &[f64] {
        let roots = &self.intersections.x_roots;
        &roots[..roots.len().min(self.max_listed_roots)]
    }

    fn y_intercept_line(&self) -> String {
        if self.intersections.y0.is_nan() {
            let reason = self
                .intersections
                .y0_failure
                .map(|failure| format!(": {}", failure))
                .unwrap_or_default();
            format!(
                "none (x = 0 is not in the domain or f(0) is not real{})",
                reason
            )
        } else {
            format!("(0, {})", format_number(self.intersections.y0))
        }
    }

    fn x_intercepts_line(&self) -> String {
        let roots = &self.intersections.x_roots;
        if roots.is_empty() {
            return match self.intersections.method {
                RootMethod::Exact => "none: f(x) = 0 has no real solution".to_string(),
                RootMethod::Numeric { window, .. } => format!(
                    "none found in [{}, {}] (no sign change of f)",
                    format_number(window.0),
                    format_number(window.1)
                ),
            };
        }
        let listed: Vec<String> = self
            .listed_roots()
            .iter()
            .map(|r| format!("x = {}", format_number(*r)))
            .collect();
        let hidden = roots.len() - self.listed_roots().len();
        let more = if hidden > 0 {
            format!(" and {} more", hidden)
        } else {
            String::new()
        };
        format!(
            "{}{} ({})",
            listed.join(", "),
            more,
            self.intersections.method
        )
    }
}

impl fmt::Display for FunctionReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Function: f(x) = {}", self.expression.source())?;
        writeln!(f, "Domain: {}", self.domain.domain)?;
        for step in &self.domain.steps {
            writeln!(f, "  - {}", step)?;
        }
        writeln!(f, "Range: {}", self.range)?;
        writeln!(f, "  ({})", self.range.method())?;
        writeln!(f, "y-intercept: {}", self.y_intercept_line())?;
        writeln!(f, "x-intercepts: {}", self.x_intercepts_line())?;
        if let Some(point) = &self.point {
            let value = if point.value.is_nan() {
                "undefined".to_string()
            } else {
                format_number(point.value)
            };
            writeln!(f, "f({}) = {}", format_number(point.point), value)?;
            for line in &point.trace {
                writeln!(f, "  {}", line)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ParseError;

    fn report(text: &str) -> FunctionReport {
        analyze(text, &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn test_report_of_a_parabola() {
        let report = report("x^2 - 4");
        let text = report.to_string();
        assert!(text.starts_with("Function: f(x) = x^2 - 4\n"));
        assert!(text.contains("Domain: ℝ\n"));
        assert!(text.contains("Range: [-4, ∞)\n"));
        assert!(text.contains("y-intercept: (0, -4)\n"));
        assert!(text.contains("x-intercepts: x = -2, x = 2 (exact solution of f(x) = 0)\n"));
        assert_eq!(report.samples.len(), 401);
        assert_eq!(report.table.len(), 21);
        assert_eq!(report.table[10], (0, -4.0));
    }

    #[test]
    fn test_report_of_a_reciprocal() {
        let text = report("1/x").to_string();
        assert!(text.contains("Domain: ℝ \\ {0}\n"));
        assert!(text.contains("Range: unbounded"));
        assert!(text.contains("y-intercept: none (x = 0 is not in the domain"));
        assert!(text.contains("x-intercepts: none: f(x) = 0 has no real solution"));
    }

    #[test]
    fn test_listed_roots_are_capped() {
        let report = report("sin(x)");
        assert_eq!(report.intersections.x_roots.len(), 7);
        let text = report.to_string();
        assert!(text.contains(" and 2 more (numeric sign-change scan"));
        let table = report.intercepts_table();
        assert!(table.contains(" -6.28319"));
        assert!(table.contains(" 3.14159"));
        assert!(!table.contains(" 6.28319"));
    }

    #[test]
    fn test_point_and_values_table() {
        let report = report("sqrt(x)").with_point(9.0);
        let text = report.to_string();
        assert!(text.contains("f(9) = 3\n"));
        assert!(report.values_table().contains("undefined"));
        let point = report.point.unwrap();
        assert_eq!(point.value, 3.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let config = AnalysisConfig::default();
        for text in ["x^2 - 4", "1/x", "log(x - 1)", "x/(x^2 + 1)"] {
            let sequential = analyze(text, &config).unwrap();
            let parallel = analyze_parallel(text, &config).unwrap();
            assert_eq!(sequential.to_string(), parallel.to_string());
            assert_eq!(sequential.domain, parallel.domain);
            assert_eq!(
                sequential.intersections.x_roots,
                parallel.intersections.x_roots
            );
        }
    }

    #[test]
    fn test_parse_errors_abort() {
        let config = AnalysisConfig::default();
        assert_eq!(
            analyze("x = 2", &config),
            Err(AnalysisError::Parse(ParseError::ContainsEquality))
        );
        assert!(matches!(
            analyze_parallel("x + y", &config),
            Err(AnalysisError::Parse(ParseError::ForeignVariables { .. }))
        ));
    }
}
