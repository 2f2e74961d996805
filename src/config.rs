//! Detection parameters and run configuration
//!
//! `D` and `T` come from the first line of the batch log. File locations come
//! from the command line, falling back to environment variables.

use serde_json::Value;
use std::env;
use std::path::PathBuf;

/// Process-wide detection parameters, fixed before any event is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    /// D: maximum friendship hops defining a neighborhood
    pub depth: usize,
    /// T: purchase history length per user and scoring window size
    pub window: usize,
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyBatchLog,
    MalformedHeader(String),
    MissingParameter(&'static str),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptyBatchLog => write!(f, "Batch log is empty, no D/T header found"),
            ConfigError::MalformedHeader(msg) => {
                write!(f, "First batch line is not in recognized JSON format: {}", msg)
            }
            ConfigError::MissingParameter(name) => write!(f, "Missing parameter in batch log: {}", name),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Params {
    pub fn new(depth: usize, window: usize) -> Result<Self, ConfigError> {
        if depth < 1 {
            return Err(ConfigError::InvalidValue(
                "D must be at least 1".to_string(),
            ));
        }
        if window < 2 {
            return Err(ConfigError::InvalidValue(format!(
                "T must be >= 2, got {}",
                window
            )));
        }
        Ok(Self { depth, window })
    }

    /// Read D and T from the batch log header line
    ///
    /// Accepts either JSON strings (`{"D":"3", "T":"50"}`) or integers.
    pub fn from_header(line: &str) -> Result<Self, ConfigError> {
        let header: Value = serde_json::from_str(line)
            .map_err(|e| ConfigError::MalformedHeader(e.to_string()))?;

        let depth = parse_param(&header, "D")?;
        let window = parse_param(&header, "T")?;

        Self::new(depth, window)
    }
}

fn parse_param(header: &Value, name: &'static str) -> Result<usize, ConfigError> {
    let value = header.get(name).ok_or(ConfigError::MissingParameter(name))?;

    let parsed = match value {
        Value::String(s) => s.trim().parse::<usize>().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        _ => None,
    };

    parsed.ok_or_else(|| ConfigError::InvalidValue(format!("{} must be a non-negative integer, got {}", name, value)))
}

/// Input and output locations for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub batch_path: PathBuf,
    pub stream_path: PathBuf,
    pub output_path: PathBuf,
}

impl RunConfig {
    /// Resolve paths from positional arguments, then environment variables
    ///
    /// Usage: `flag_anomalies <batch_log> <stream_log> <output_file>`
    ///
    /// Environment variables (used when no arguments are given):
    /// - `BATCH_LOG_PATH` (default: log_input/batch_log.json)
    /// - `STREAM_LOG_PATH` (default: log_input/stream_log.json)
    /// - `FLAGGED_OUTPUT_PATH` (default: log_output/flagged_purchases.json)
    pub fn from_args_and_env<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let positional: Vec<String> = args.into_iter().skip(1).collect();

        match positional.len() {
            0 => Ok(Self::from_env()),
            3 => Ok(Self {
                batch_path: positional[0].clone().into(),
                stream_path: positional[1].clone().into(),
                output_path: positional[2].clone().into(),
            }),
            n => Err(ConfigError::InvalidValue(format!(
                "expected 3 arguments (batch_log stream_log output_file), got {}",
                n
            ))),
        }
    }

    pub fn from_env() -> Self {
        Self {
            batch_path: env::var("BATCH_LOG_PATH")
                .unwrap_or_else(|_| "log_input/batch_log.json".to_string())
                .into(),
            stream_path: env::var("STREAM_LOG_PATH")
                .unwrap_or_else(|_| "log_input/stream_log.json".to_string())
                .into(),
            output_path: env::var("FLAGGED_OUTPUT_PATH")
                .unwrap_or_else(|_| "log_output/flagged_purchases.json".to_string())
                .into(),
        }
    }
}
