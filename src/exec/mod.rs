// src/exec/mod.rs

//! Process execution layer.
//!
//! This is where gifski actually runs:
//!
//! - [`log_buffer`] keeps a bounded, ordered copy of captured output.
//! - [`progress`] extracts `Frame N / M` progress markers from stdout.
//! - [`process`] spawns the child and turns its two pipes and its exit into
//!   a stream of [`ProcessSignal`]s.
//! - [`reconciler`] joins the three completion signals into one result.
//! - [`coordinator`] is the public entry point ([`GifskiCommand`]) with the
//!   non-blocking and blocking execution modes.

pub mod coordinator;
pub mod log_buffer;
pub mod process;
pub mod progress;
pub mod reconciler;

pub use coordinator::{CommandEvent, Execution, GifskiCommand};
pub use log_buffer::LogBuffer;
pub use process::{
    BlockingStdio, ExitOutcome, KillSignal, OutputChunk, ProcessHandle, ProcessSignal,
    SpawnOptions, StdoutMode,
};
pub use progress::{ProgressEvent, parse_progress};
pub use reconciler::{CompletionReconciler, StdoutCapture};

use crate::errors::ExecError;

/// Captured stdout of one execution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CapturedOutput {
    /// Diagnostic text (output written to a real file).
    Text(String),
    /// The encoded artifact (output written to stdout).
    Binary(Vec<u8>),
    /// Nothing was captured.
    #[default]
    Absent,
}

impl CapturedOutput {
    pub fn is_absent(&self) -> bool {
        matches!(self, CapturedOutput::Absent)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CapturedOutput::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            CapturedOutput::Text(s) => Some(s.as_bytes()),
            CapturedOutput::Binary(b) => Some(b),
            CapturedOutput::Absent => None,
        }
    }
}

/// Terminal outcome of one execution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionResult {
    pub error: Option<ExecError>,
    pub stdout: CapturedOutput,
    pub stderr: Option<String>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
