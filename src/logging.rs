// src/logging.rs

//! Logging setup for programs built on `inotools`, using `tracing` +
//! `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. the level passed by the caller (if any)
//! 2. `INOTOOLS_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Logs are sent to STDERR so that stdout stays free for formatted events.

use std::str::FromStr;

use anyhow::{anyhow, Result};
use tracing_subscriber::fmt;

/// Environment variable consulted when no level is passed explicitly.
pub const LOG_ENV_VAR: &str = "INOTOOLS_LOG";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(anyhow!("unknown log level '{other}'")),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Level that [`init_logging`] would use for `explicit`.
pub fn resolve_level(explicit: Option<LogLevel>) -> tracing::Level {
    match explicit {
        Some(lvl) => lvl.into(),
        None => std::env::var(LOG_ENV_VAR)
            .ok()
            .and_then(|s| s.parse::<LogLevel>().ok())
            .map(tracing::Level::from)
            .unwrap_or(tracing::Level::INFO),
    }
}

/// Initialise the global logging subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(level: Option<LogLevel>) -> Result<()> {
    fmt()
        .with_max_level(resolve_level(level))
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install logging subscriber: {e}"))
}
