//! Console and file logging on top of `simplelog`.
use crate::errors::ConfigError;
use chrono::Local;
use log::info;
use simplelog::*;
use std::fs::File;

/// Maps a level name to a filter. Accepted: `debug`, `info`, `warn`, `error`, `off`
/// (case-insensitive).
pub fn parse_level(level: &str) -> Result<LevelFilter, ConfigError> {
    match level.trim().to_lowercase().as_str() {
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" => Ok(LevelFilter::Off),
        _ => Err(ConfigError::UnknownLogLevel(level.to_string())),
    }
}

/// Default name of the log file: `log_<date>_<time>.txt` in the working directory.
pub fn default_log_file() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// Installs the global logger: terminal output always, plus a file when `file` is given.
/// A second call keeps the logger installed first.
pub fn init_logger(level: &str, file: Option<&str>) -> Result<(), ConfigError> {
    let level = parse_level(level)?;
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(name) = file {
        loggers.push(WriteLogger::new(level, Config::default(), File::create(name)?));
    }
    match CombinedLogger::init(loggers) {
        Ok(()) => info!("logging at level {}", level),
        Err(_) => info!("logger already installed"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level(" INFO ").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level("warn").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_level("error").unwrap(), LevelFilter::Error);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::Off);
    }

    #[test]
    fn test_unknown_level_is_an_error() {
        assert!(matches!(
            parse_level("verbose"),
            Err(ConfigError::UnknownLogLevel(name)) if name == "verbose"
        ));
        assert!(init_logger("loud", None).is_err());
    }

    #[test]
    fn test_default_file_name() {
        let name = default_log_file();
        assert!(name.starts_with("log_"));
        assert!(name.ends_with(".txt"));
        assert_eq!(name.len(), "log_2024-01-01_00-00-00.txt".len());
    }

    #[test]
    fn test_logging_into_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.log");
        init_logger("info", path.to_str()).unwrap();
        assert!(path.exists());
    }
}
