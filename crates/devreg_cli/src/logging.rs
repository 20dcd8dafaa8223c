//! Logging setup.
//!
//! Installs a global `tracing` subscriber writing to stdout. The level comes
//! from `--log-level` unless `RUST_LOG` is set.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Informational messages.
    Info,
    /// Debug output, including rejected requests.
    Debug,
    /// Everything.
    Trace,
}

impl LogLevel {
    /// Returns the `EnvFilter` directive for this level.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Builds the filter: `RUST_LOG` when set, otherwise `level`.
pub fn filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()))
}

/// Initializes the global subscriber.
pub fn init(level: LogLevel, format: LogFormat) {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(level));
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().flatten_event(true).init(),
    }
}
