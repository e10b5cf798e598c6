// src/exec/reconciler.rs

//! Completion reconciler.
//!
//! A gifski process closes three OS resources independently and in no
//! particular order: the stdout pipe, the stderr pipe, and the process
//! itself. The reconciler records each of these completion signals together
//! with the captured output, and produces the [`ExecutionResult`] exactly
//! once: at the instant the last of the three is observed.
//!
//! It is a plain synchronous state machine with no Tokio types, so every
//! interleaving can be driven directly from unit tests. At runtime a single
//! consumer task owns it, which gives the mutual exclusion the three flags
//! need.

use tracing::debug;

use crate::errors::ExecError;
use crate::exec::log_buffer::LogBuffer;
use crate::exec::process::{ExitOutcome, OutputChunk, ProcessSignal};
use crate::exec::{CapturedOutput, ExecutionResult};

/// How stdout is retained for the final result.
#[derive(Debug, Clone)]
pub enum StdoutCapture {
    /// Diagnostic text lines, bounded by the retention limit.
    Text(LogBuffer<String>),
    /// Encoded artifact bytes. Never truncated: evicting chunks would
    /// corrupt the GIF.
    Binary(LogBuffer<Vec<u8>>),
    /// Nothing kept (quiet mode).
    Discard,
}

impl StdoutCapture {
    fn push(&mut self, chunk: OutputChunk) {
        match (self, chunk) {
            (StdoutCapture::Text(buf), OutputChunk::Line(line)) => buf.append(line),
            (StdoutCapture::Text(buf), OutputChunk::Bytes(bytes)) => {
                buf.append(String::from_utf8_lossy(&bytes).into_owned())
            }
            (StdoutCapture::Binary(buf), OutputChunk::Bytes(bytes)) => buf.append(bytes),
            (StdoutCapture::Binary(buf), OutputChunk::Line(line)) => {
                buf.append(line.into_bytes())
            }
            (StdoutCapture::Discard, _) => {}
        }
    }

    fn materialize(&self) -> CapturedOutput {
        match self {
            StdoutCapture::Text(buf) => buf
                .materialize()
                .map_or(CapturedOutput::Absent, CapturedOutput::Text),
            StdoutCapture::Binary(buf) => buf
                .materialize()
                .map_or(CapturedOutput::Absent, CapturedOutput::Binary),
            StdoutCapture::Discard => CapturedOutput::Absent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    Finalized,
}

#[derive(Debug)]
pub struct CompletionReconciler {
    program: String,
    state: State,
    stdout_closed: bool,
    stderr_closed: bool,
    exited: bool,
    pending_error: Option<ExecError>,
    stdout: StdoutCapture,
    stderr: LogBuffer<String>,
}

impl CompletionReconciler {
    pub fn new(program: impl Into<String>, stdout: StdoutCapture, stderr_limit: usize) -> Self {
        Self {
            program: program.into(),
            state: State::Running,
            stdout_closed: false,
            stderr_closed: false,
            exited: false,
            pending_error: None,
            stdout,
            stderr: LogBuffer::new(stderr_limit),
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.state == State::Finalized
    }

    /// The error known so far, if the process has already exited abnormally.
    pub fn pending_error(&self) -> Option<&ExecError> {
        self.pending_error.as_ref()
    }

    /// Record one signal. Returns the result exactly once, when the last of
    /// the three completion signals arrives; `None` otherwise and forever
    /// after finalization.
    pub fn observe(&mut self, signal: ProcessSignal) -> Option<ExecutionResult> {
        if self.state == State::Finalized {
            debug!(?signal, "signal after finalization ignored");
            return None;
        }

        match signal {
            ProcessSignal::StdoutData(chunk) => self.stdout.push(chunk),
            ProcessSignal::StderrData(line) => self.stderr.append(line),
            ProcessSignal::StdoutClosed => self.stdout_closed = true,
            ProcessSignal::StderrClosed => self.stderr_closed = true,
            ProcessSignal::Exited(outcome) => self.record_exit(outcome),
        }

        self.try_finalize()
    }

    fn record_exit(&mut self, outcome: ExitOutcome) {
        self.exited = true;
        let program = self.program.clone();
        match outcome {
            ExitOutcome::Code(0) => {}
            ExitOutcome::Code(code) => {
                self.pending_error = Some(ExecError::ProcessFailed {
                    program,
                    code,
                    stderr: None,
                });
            }
            ExitOutcome::Signal(signal) => {
                self.pending_error = Some(ExecError::ProcessKilled { program, signal });
            }
            ExitOutcome::LaunchError(reason) => {
                // No streams exist, so they will never report closing.
                self.stdout_closed = true;
                self.stderr_closed = true;
                self.pending_error = Some(ExecError::LaunchFailed { program, reason });
            }
        }
    }

    fn try_finalize(&mut self) -> Option<ExecutionResult> {
        if !(self.stdout_closed && self.stderr_closed && self.exited) {
            return None;
        }
        self.state = State::Finalized;

        let stdout = self.stdout.materialize();
        let stderr = self.stderr.materialize();
        let error = self
            .pending_error
            .take()
            .map(|err| err.with_stderr(stderr.as_deref()));

        debug!(program = %self.program, failed = error.is_some(), "execution finalized");

        Some(ExecutionResult {
            error,
            stdout,
            stderr,
        })
    }
}
