#![allow(non_snake_case)]
use RustedFuncAnalysis::Examples::analysis_examples::analysis_examples;
use RustedFuncAnalysis::Utils::logger::{default_log_file, init_logger};
use RustedFuncAnalysis::analysis::point_eval::evaluate_at_text;
use RustedFuncAnalysis::{AnalysisConfig, analyze, analyze_parallel};
use clap::{Parser, ValueEnum};
use std::process::ExitCode;

/// Analyze a real function of one variable: domain, range, intercepts, values.
#[derive(Debug, Parser)]
#[command(name = "RustedFuncAnalysis")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Function to analyze, e.g. "1/(x^2 - 4)"
    #[arg(required_unless_present = "example")]
    function: Option<String>,

    /// Also evaluate the function at this point (may be symbolic, e.g. "pi/2")
    #[arg(long)]
    at: Option<String>,

    /// Settings file with [range], [roots], [samples] and [report] sections
    #[arg(short, long)]
    config: Option<String>,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log: LogLevel,

    /// Also log to a file; a timestamped name is used when none is given
    #[arg(long, num_args = 0..=1)]
    log_file: Option<Option<String>>,

    /// Run the independent analyses concurrently
    #[arg(long)]
    parallel: bool,

    /// Run one of the built-in examples instead of analyzing a function
    #[arg(long, conflicts_with = "function")]
    example: Option<usize>,
}

/// Log levels accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    fn name(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl Cli {
    fn log_file(&self) -> Option<String> {
        self.log_file
            .as_ref()
            .map(|name| name.clone().unwrap_or_else(default_log_file))
    }
}

fn run(cli: Cli) -> Result<(), String> {
    init_logger(cli.log.name(), cli.log_file().as_deref()).map_err(|err| err.to_string())?;

    if let Some(example) = cli.example {
        analysis_examples(example);
        return Ok(());
    }
    let function = cli
        .function
        .ok_or_else(|| "a function to analyze is required".to_string())?;
    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path).map_err(|err| err.to_string())?,
        None => AnalysisConfig::default(),
    };

    let report = if cli.parallel {
        analyze_parallel(&function, &config)
    } else {
        analyze(&function, &config)
    }
    .map_err(|err| err.to_string())?;

    let report = match &cli.at {
        Some(point) => {
            let evaluation =
                evaluate_at_text(&report.expression, point).map_err(|err| err.to_string())?;
            report.with_point(evaluation.point)
        }
        None => report,
    };
    println!("{}", report);
    println!("{}", report.intercepts_table());
    println!("{}", report.values_table());
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}
