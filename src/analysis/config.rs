//! Numeric knobs of the analyses, with the documented defaults and loading from a
//! settings document (see [`crate::Utils::settings_parser`]).
use crate::Utils::settings_parser::{Value, parse_document};
use crate::errors::ConfigError;
use crate::numerical::bisection::RootFindingConfig;
use crate::numerical::sampling::{MAX_GRID_POINTS, grid_len};
use log::info;
use std::path::Path;

/// Sampling fallback of the range estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSettings {
    pub window: (f64, f64),
    pub step: f64,
    /// samples with |y| at or above this are treated as near-asymptote blow-ups
    pub cutoff: f64,
}

impl Default for RangeSettings {
    fn default() -> Self {
        Self {
            window: (-10.0, 10.0),
            step: 0.1,
            cutoff: 1e6,
        }
    }
}

/// Exact and numeric x-intercept search.
#[derive(Debug, Clone, PartialEq)]
pub struct RootSettings {
    pub window: (f64, f64),
    pub step: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
    /// numeric roots closer than this are one root
    pub dedup_threshold: f64,
    pub max_roots: usize,
    /// decimals kept for exact roots
    pub digits: u32,
    pub max_exact_roots: usize,
    pub verbose: bool,
}

impl Default for RootSettings {
    fn default() -> Self {
        Self {
            window: (-10.0, 10.0),
            step: 0.1,
            tolerance: 1e-6,
            max_iterations: 50,
            dedup_threshold: 1e-3,
            max_roots: 10,
            digits: 5,
            max_exact_roots: 10,
            verbose: false,
        }
    }
}

impl RootSettings {
    pub fn bisection_config(&self) -> RootFindingConfig {
        RootFindingConfig {
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            verbose: self.verbose,
        }
    }
}

/// Curve samples handed to a plotting consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSettings {
    pub window: (f64, f64),
    pub step: f64,
    /// integer abscissae of the value table
    pub grid: (i64, i64),
}

impl Default for SampleSettings {
    fn default() -> Self {
        Self {
            window: (-10.0, 10.0),
            step: 0.05,
            grid: (-10, 10),
        }
    }
}

/// Presentation limits of the text report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    /// x-intercepts printed in the report
    pub max_listed_roots: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self { max_listed_roots: 5 }
    }
}

/// Every setting of one analysis run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisConfig {
    pub range: RangeSettings,
    pub roots: RootSettings,
    pub samples: SampleSettings,
    pub report: ReportSettings,
}

impl AnalysisConfig {
    /// Defaults overridden by the keys present in `text`.
    pub fn from_document(text: &str) -> Result<Self, ConfigError> {
        let document = parse_document(text)?;
        let mut config = Self::default();
        for (section, entries) in &document {
            for (key, values) in entries {
                let field = Field {
                    section,
                    key,
                    values,
                };
                match section.as_str() {
                    "range" => config.range.apply(&field)?,
                    "roots" => config.roots.apply(&field)?,
                    "samples" => config.samples.apply(&field)?,
                    "report" => config.report.apply(&field)?,
                    _ => return Err(ConfigError::UnknownSection(section.clone())),
                }
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_document(&text)?;
        info!("settings loaded from {}", path.as_ref().display());
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("range", "window", self.range.window.0 < self.range.window.1),
            ("range", "step", self.range.step > 0.0),
            ("range", "cutoff", self.range.cutoff > 0.0),
            ("roots", "window", self.roots.window.0 < self.roots.window.1),
            ("roots", "step", self.roots.step > 0.0),
            ("roots", "tolerance", self.roots.tolerance > 0.0),
            ("samples", "window", self.samples.window.0 < self.samples.window.1),
            ("samples", "step", self.samples.step > 0.0),
            ("samples", "grid", self.samples.grid.0 <= self.samples.grid.1),
        ];
        if let Some((section, key, _)) = checks.iter().find(|(_, _, ok)| !ok) {
            return Err(bad_value(
                section,
                key,
                "must be positive (windows: lower end below upper end)",
            ));
        }

        let grid_span = i128::from(self.samples.grid.1) - i128::from(self.samples.grid.0) + 1;
        let sizes = [
            ("range", grid_len(self.range.window, self.range.step).is_some()),
            ("roots", grid_len(self.roots.window, self.roots.step).is_some()),
            ("samples", grid_len(self.samples.window, self.samples.step).is_some()),
        ];
        if let Some((section, _)) = sizes.iter().find(|(_, ok)| !ok) {
            return Err(bad_value(
                section,
                "step",
                &format!(
                    "window / step must be finite and give at most {} points",
                    MAX_GRID_POINTS
                ),
            ));
        }
        if grid_span > MAX_GRID_POINTS as i128 {
            return Err(bad_value(
                "samples",
                "grid",
                &format!("at most {} integers", MAX_GRID_POINTS),
            ));
        }
        Ok(())
    }
}

fn bad_value(section: &str, key: &str, reason: &str) -> ConfigError {
    ConfigError::BadValue {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// One `key: values` entry of a settings section.
struct Field<'a> {
    section: &'a str,
    key: &'a str,
    values: &'a [Value],
}

impl Field<'_> {
    fn bad(&self, reason: &str) -> ConfigError {
        bad_value(self.section, self.key, reason)
    }

    fn unknown(&self) -> ConfigError {
        ConfigError::UnknownKey {
            section: self.section.to_string(),
            key: self.key.to_string(),
        }
    }

    fn float(&self) -> Result<f64, ConfigError> {
        match self.values {
            [value] => value.as_float().ok_or_else(|| self.bad("expected a number")),
            _ => Err(self.bad("expected exactly one value")),
        }
    }

    fn count(&self) -> Result<usize, ConfigError> {
        match self.values {
            [value] => value
                .as_integer()
                .and_then(|i| usize::try_from(i).ok())
                .ok_or_else(|| self.bad("expected a non-negative integer")),
            _ => Err(self.bad("expected exactly one value")),
        }
    }

    fn flag(&self) -> Result<bool, ConfigError> {
        match self.values {
            [value] => value.as_boolean().ok_or_else(|| self.bad("expected true or false")),
            _ => Err(self.bad("expected exactly one value")),
        }
    }

    fn window(&self) -> Result<(f64, f64), ConfigError> {
        match self.values {
            [lo, hi] => match (lo.as_float(), hi.as_float()) {
                (Some(lo), Some(hi)) => Ok((lo, hi)),
                _ => Err(self.bad("expected two numbers")),
            },
            _ => Err(self.bad("expected two values: lower, upper")),
        }
    }

    fn integer_window(&self) -> Result<(i64, i64), ConfigError> {
        match self.values {
            [lo, hi] => match (lo.as_integer(), hi.as_integer()) {
                (Some(lo), Some(hi)) => Ok((lo, hi)),
                _ => Err(self.bad("expected two integers")),
            },
            _ => Err(self.bad("expected two values: lower, upper")),
        }
    }
}

trait ApplyField {
    fn apply(&mut self, field: &Field) -> Result<(), ConfigError>;
}

impl ApplyField for RangeSettings {
    fn apply(&mut self, field: &Field) -> Result<(), ConfigError> {
        match field.key {
            "window" => self.window = field.window()?,
            "step" => self.step = field.float()?,
            "cutoff" => self.cutoff = field.float()?,
            _ => return Err(field.unknown()),
        }
        Ok(())
    }
}

impl ApplyField for RootSettings {
    fn apply(&mut self, field: &Field) -> Result<(), ConfigError> {
        match field.key {
            "window" => self.window = field.window()?,
            "step" => self.step = field.float()?,
            "tolerance" => self.tolerance = field.float()?,
            "max_iterations" => self.max_iterations = field.count()?,
            "dedup" => self.dedup_threshold = field.float()?,
            "max_roots" => self.max_roots = field.count()?,
            "digits" => {
                self.digits = u32::try_from(field.count()?).map_err(|_| field.bad("too large"))?
            }
            "max_exact_roots" => self.max_exact_roots = field.count()?,
            "verbose" => self.verbose = field.flag()?,
            _ => return Err(field.unknown()),
        }
        Ok(())
    }
}

impl ApplyField for SampleSettings {
    fn apply(&mut self, field: &Field) -> Result<(), ConfigError> {
        match field.key {
            "window" => self.window = field.window()?,
            "step" => self.step = field.float()?,
            "grid" => self.grid = field.integer_window()?,
            _ => return Err(field.unknown()),
        }
        Ok(())
    }
}

impl ApplyField for ReportSettings {
    fn apply(&mut self, field: &Field) -> Result<(), ConfigError> {
        match field.key {
            "max_listed_roots" => self.max_listed_roots = field.count()?,
            _ => return Err(field.unknown()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.range.window, (-10.0, 10.0));
        assert_eq!(config.range.step, 0.1);
        assert_eq!(config.roots.dedup_threshold, 1e-3);
        assert_eq!(config.roots.max_roots, 10);
        assert_eq!(config.roots.bisection_config().max_iterations, 50);
        assert_eq!(config.report.max_listed_roots, 5);
    }

    #[test]
    fn test_document_overrides_only_given_keys() {
        let config =
            AnalysisConfig::from_document("range window: -20, 20 step: 0.05\nroots max_roots: 5")
                .unwrap();
        assert_eq!(config.range.window, (-20.0, 20.0));
        assert_eq!(config.range.step, 0.05);
        assert_eq!(config.range.cutoff, 1e6);
        assert_eq!(config.roots.max_roots, 5);
        assert_eq!(config.roots.tolerance, 1e-6);
    }

    #[test]
    fn test_document_errors() {
        assert!(matches!(
            AnalysisConfig::from_document("plot color: red"),
            Err(ConfigError::UnknownSection(s)) if s == "plot"
        ));
        assert!(matches!(
            AnalysisConfig::from_document("range colour: 1"),
            Err(ConfigError::UnknownKey { .. })
        ));
        assert!(matches!(
            AnalysisConfig::from_document("range window: 1"),
            Err(ConfigError::BadValue { .. })
        ));
        assert!(matches!(
            AnalysisConfig::from_document("roots step: -0.1"),
            Err(ConfigError::BadValue { .. })
        ));
        assert!(matches!(
            AnalysisConfig::from_document("samples grid: 3, -3"),
            Err(ConfigError::BadValue { .. })
        ));
    }

    #[test]
    fn test_windows_too_fine_to_sample() {
        for document in [
            "roots step: 1e-300",
            "range window: -1e300, 1e300",
            "samples window: 0, 1 step: 1e-7",
            "samples grid: -9000000000, 9000000000",
        ] {
            assert!(
                matches!(
                    AnalysisConfig::from_document(document),
                    Err(ConfigError::BadValue { .. })
                ),
                "{}",
                document
            );
        }
        match AnalysisConfig::from_document("roots step: 1e-300") {
            Err(ConfigError::BadValue { section, key, .. }) => {
                assert_eq!((section.as_str(), key.as_str()), ("roots", "step"))
            }
            other => panic!("unexpected {:?}", other),
        }
        let fine = AnalysisConfig::from_document("samples window: 0, 1 step: 1e-5").unwrap();
        assert_eq!(fine.samples.step, 1e-5);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# custom precision").unwrap();
        writeln!(file, "roots").unwrap();
        writeln!(file, "  tolerance: 1e-9").unwrap();
        writeln!(file, "  verbose: true").unwrap();
        writeln!(file, "samples grid: -3, 3").unwrap();
        let config = AnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.roots.tolerance, 1e-9);
        assert!(config.roots.verbose);
        assert_eq!(config.samples.grid, (-3, 3));

        let missing = AnalysisConfig::from_file("/definitely/not/here.txt");
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
