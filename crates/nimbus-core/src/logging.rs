//! Logging setup for applications embedding the nimbus clients
//!
//! The library itself only emits `tracing` events (and `log` records from the
//! retry loop). Applications that do not install their own subscriber can
//! call [`init`] once at start-up.

use std::env;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{Error, ErrorKind, Result};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum level or full filter directive, e.g. `info` or `nimbus_core=trace`
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include file and line numbers
    pub source_location: bool,
    /// Emit ANSI colours (ignored for JSON)
    pub ansi: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            source_location: false,
            ansi: false,
        }
    }
}

impl LogConfig {
    /// Config from a verbosity count: 0 warn, 1 info, 2 debug, 3+ trace
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        Self {
            level: level.to_string(),
            source_location: verbosity >= 2,
            ..Self::default()
        }
    }

    /// Apply `RUST_LOG` and `NIMBUS_LOG_FORMAT` overrides
    pub fn merge_with_env(&mut self) {
        if let Ok(rust_log) = env::var("RUST_LOG") {
            if !rust_log.is_empty() {
                self.level = rust_log;
            }
        }

        if let Ok(format) = env::var("NIMBUS_LOG_FORMAT") {
            match format.to_lowercase().as_str() {
                "compact" => self.format = LogFormat::Compact,
                "json" => self.format = LogFormat::Json,
                _ => tracing::warn!("Invalid log format: {}, using default", format),
            }
        }
    }
}

/// Install the global subscriber
///
/// Fails with `Internal` when a global subscriber is already set, including
/// by a previous call.
pub fn init(config: LogConfig) -> Result<()> {
    let filter = create_env_filter(&config)?;

    let installed = match config.format {
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(config.ansi)
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .compact()
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .json()
            .try_init(),
    };

    installed.map_err(|e| {
        Error::wrap(
            ErrorKind::Internal,
            format!("failed to initialize logging: {}", e),
        )
    })?;

    tracing::debug!(config = ?config, "logging initialized");
    Ok(())
}

fn create_env_filter(config: &LogConfig) -> Result<EnvFilter> {
    EnvFilter::try_new(&config.level).map_err(|e| {
        Error::wrap(
            ErrorKind::ValidationFailed,
            format!("invalid log filter '{}': {}", config.level, e),
        )
    })
}
