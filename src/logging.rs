// src/logging.rs

//! `tracing` subscriber for the `gifski-command` binary.
//!
//! The level is taken from `--log-level`, else from `GIFSKI_COMMAND_LOG`,
//! else `warn`, which keeps ordinary runs down to the user-facing progress
//! lines. Everything is written to stderr: with `-o -` stdout carries the
//! encoded GIF.

use std::str::FromStr;

use anyhow::{Result, anyhow};
use tracing::Level;

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "GIFSKI_COMMAND_LOG";

const DEFAULT_LEVEL: Level = Level::WARN;

impl From<LogLevel> for Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Pick the effective level. An unparsable env value falls back to the
/// default instead of failing startup.
pub fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Level {
    if let Some(lvl) = cli_level {
        return lvl.into();
    }
    env_value
        .and_then(|s| Level::from_str(s.trim()).ok())
        .unwrap_or(DEFAULT_LEVEL)
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV).ok();
    let level = resolve_level(cli_level, env_value.as_deref());

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to initialise logging: {e}"))
}
