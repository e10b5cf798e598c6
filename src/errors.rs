// src/errors.rs

//! Crate-wide error types.
//!
//! [`ExecError`] is the normalized failure carried inside an
//! [`ExecutionResult`](crate::exec::ExecutionResult); it is cheap to clone so
//! the same value can be handed to event subscribers and to the awaiting
//! caller. [`GifskiError`] covers everything that can go wrong *around* an
//! execution: invalid configuration, executable discovery, config file IO.

use thiserror::Error;

/// Failure of a single encoder execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// The process could not be started at all (missing binary, permissions).
    #[error("failed to launch {program}: {reason}")]
    LaunchFailed { program: String, reason: String },

    /// The process exited with a nonzero status code.
    ///
    /// `stderr` holds the captured diagnostic text, if any was captured.
    #[error("{program} exited with code {code}{}", stderr_suffix(.stderr))]
    ProcessFailed {
        program: String,
        code: i32,
        stderr: Option<String>,
    },

    /// The process was terminated by a signal (e.g. `SIGKILL`).
    #[error("{program} was killed with signal {signal}")]
    ProcessKilled { program: String, signal: String },
}

fn stderr_suffix(stderr: &Option<String>) -> String {
    match stderr {
        Some(text) => format!(": {text}"),
        None => String::new(),
    }
}

impl ExecError {
    /// Attach captured stderr text as the diagnostic detail of a nonzero exit.
    ///
    /// Only `ProcessFailed` is augmented; other kinds are returned unchanged.
    pub fn with_stderr(self, text: Option<&str>) -> Self {
        match (self, text) {
            (ExecError::ProcessFailed { program, code, .. }, Some(text)) => {
                ExecError::ProcessFailed {
                    program,
                    code,
                    stderr: Some(text.to_string()),
                }
            }
            (other, _) => other,
        }
    }
}

#[derive(Error, Debug)]
pub enum GifskiError {
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("gifski executable not found: {0}")]
    ExecutableNotFound(String),

    #[error(transparent)]
    Execution(#[from] ExecError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, GifskiError>;
