// src/exec/coordinator.rs

//! Public entry point for running gifski.
//!
//! [`GifskiCommand`] holds the injected executable path and validated
//! options. It offers two execution modes:
//!
//! - [`GifskiCommand::start`] / [`GifskiCommand::run`]: non-blocking; stdout
//!   and stderr are drained concurrently, progress markers are surfaced as
//!   [`CommandEvent::Progress`], and the result is produced by the
//!   [`CompletionReconciler`] once all three completion signals arrived.
//! - [`GifskiCommand::run_blocking`]: waits synchronously for the process;
//!   no notifications, and SIGTERM counts as a clean stop.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::anyhow;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::config::{EncodeOptions, Output, build_spawn_args};
use crate::errors::{ExecError, GifskiError, Result};
use crate::exec::log_buffer::LogBuffer;
use crate::exec::process::{
    BlockingStdio, ExitOutcome, KillSignal, OutputChunk, ProcessHandle, ProcessSignal,
    SpawnOptions, StdoutMode,
};
use crate::exec::progress::{ProgressEvent, parse_progress};
use crate::exec::reconciler::{CompletionReconciler, StdoutCapture};
use crate::exec::{CapturedOutput, ExecutionResult};

const DEFAULT_PROGRAM_NAME: &str = "gifski";

/// Notification emitted while a non-blocking execution runs.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandEvent {
    /// A progress marker was read from stdout.
    Progress(ProgressEvent),
    /// The process could not be started. Always followed by `End`.
    Error(ExecError),
    /// Final result; emitted exactly once, last.
    End(ExecutionResult),
}

/// A gifski invocation: executable + options.
#[derive(Debug, Clone)]
pub struct GifskiCommand {
    program: PathBuf,
    program_name: String,
    options: EncodeOptions,
    spawn_options: SpawnOptions,
}

impl GifskiCommand {
    /// `program` is the resolved gifski executable (see
    /// [`crate::locate::resolve_executable`]).
    pub fn new(program: impl Into<PathBuf>, options: EncodeOptions) -> Self {
        let program = program.into();
        let program_name = program
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_PROGRAM_NAME)
            .to_string();
        Self {
            program,
            program_name,
            options,
            spawn_options: SpawnOptions::default(),
        }
    }

    pub fn with_spawn_options(mut self, spawn_options: SpawnOptions) -> Self {
        self.spawn_options = spawn_options;
        self
    }

    /// Name used in error messages; defaults to the executable's file stem.
    pub fn with_program_name(mut self, name: impl Into<String>) -> Self {
        self.program_name = name.into();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    pub fn spawn_args(&self) -> Vec<OsString> {
        build_spawn_args(&self.options)
    }

    fn stdout_mode(&self) -> StdoutMode {
        match self.options.output() {
            Output::Stdout => StdoutMode::Raw,
            Output::File(_) => StdoutMode::Lines,
        }
    }

    fn stdout_capture(&self) -> StdoutCapture {
        match self.options.output() {
            Output::Stdout => StdoutCapture::Binary(LogBuffer::unbounded()),
            Output::File(_) if self.options.quiet() => StdoutCapture::Discard,
            Output::File(_) => StdoutCapture::Text(LogBuffer::new(self.options.log_lines())),
        }
    }

    /// Start gifski without blocking.
    ///
    /// Must be called within a Tokio runtime. Launch failures are not
    /// returned here; they arrive as `CommandEvent::Error` followed by
    /// `CommandEvent::End` and in the awaited result.
    pub fn start(&self) -> Execution {
        let args = self.spawn_args();
        let stdout_mode = self.stdout_mode();
        info!(
            program = %self.program.display(),
            frames = self.options.frames().len(),
            output = ?self.options.output(),
            "starting gifski"
        );

        let mut handle =
            ProcessHandle::spawn(&self.program, &args, &self.spawn_options, stdout_mode);
        let pid = handle.pid();
        let terminate = handle.take_terminator();

        let reconciler = CompletionReconciler::new(
            self.program_name.clone(),
            self.stdout_capture(),
            self.options.log_lines(),
        );

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = oneshot::channel();

        tokio::spawn(drive(
            handle,
            reconciler,
            stdout_mode == StdoutMode::Lines,
            events_tx,
            result_tx,
        ));

        Execution {
            events: events_rx,
            result: result_rx,
            terminate,
            pid,
        }
    }

    /// Start gifski and wait for the result, ignoring notifications.
    pub async fn run(&self) -> Result<ExecutionResult> {
        self.start().wait().await
    }

    /// Run gifski synchronously.
    ///
    /// By default the child inherits this process's stdout/stderr and the
    /// result carries no captured output; use
    /// [`BlockingStdio::Capture`] to collect it instead. Captured stderr is
    /// not appended to error messages in this mode.
    pub fn run_blocking(&self) -> ExecutionResult {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(self.spawn_args()).stdin(Stdio::null());
        self.spawn_options.apply_std(&mut cmd);

        info!(
            program = %self.program.display(),
            frames = self.options.frames().len(),
            stdio = ?self.spawn_options.blocking_stdio,
            "running gifski (blocking)"
        );

        let (outcome, stdout, stderr) = match self.spawn_options.blocking_stdio {
            BlockingStdio::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
                match cmd.status() {
                    Ok(status) => (ExitOutcome::from_status(status), CapturedOutput::Absent, None),
                    Err(e) => (
                        ExitOutcome::LaunchError(e.to_string()),
                        CapturedOutput::Absent,
                        None,
                    ),
                }
            }
            BlockingStdio::Capture => match cmd.output() {
                Ok(output) => (
                    ExitOutcome::from_status(output.status),
                    self.capture_stdout_bytes(output.stdout),
                    self.capture_stderr_bytes(&output.stderr),
                ),
                Err(e) => (
                    ExitOutcome::LaunchError(e.to_string()),
                    CapturedOutput::Absent,
                    None,
                ),
            },
        };

        info!(?outcome, "gifski exited (blocking)");

        ExecutionResult {
            error: self.blocking_error(outcome),
            stdout,
            stderr,
        }
    }

    fn blocking_error(&self, outcome: ExitOutcome) -> Option<ExecError> {
        let program = self.program_name.clone();
        match outcome {
            ExitOutcome::Code(0) => None,
            ExitOutcome::Code(code) => Some(ExecError::ProcessFailed {
                program,
                code,
                stderr: None,
            }),
            ExitOutcome::Signal(signal) if signal == "SIGTERM" => {
                debug!("gifski stopped with SIGTERM; treating as clean stop");
                None
            }
            ExitOutcome::Signal(signal) => Some(ExecError::ProcessKilled { program, signal }),
            ExitOutcome::LaunchError(reason) => Some(ExecError::LaunchFailed { program, reason }),
        }
    }

    fn capture_stdout_bytes(&self, bytes: Vec<u8>) -> CapturedOutput {
        if bytes.is_empty() {
            return CapturedOutput::Absent;
        }
        match self.stdout_capture() {
            StdoutCapture::Binary(_) => CapturedOutput::Binary(bytes),
            StdoutCapture::Discard => CapturedOutput::Absent,
            StdoutCapture::Text(mut buf) => {
                for line in split_text_lines(&bytes) {
                    buf.append(line);
                }
                buf.materialize()
                    .map_or(CapturedOutput::Absent, CapturedOutput::Text)
            }
        }
    }

    fn capture_stderr_bytes(&self, bytes: &[u8]) -> Option<String> {
        let mut buf = LogBuffer::new(self.options.log_lines());
        for line in split_text_lines(bytes) {
            buf.append(line);
        }
        buf.materialize()
    }
}

fn split_text_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .split(['\n', '\r'])
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Single consumer of a process's signals.
async fn drive(
    mut handle: ProcessHandle,
    mut reconciler: CompletionReconciler,
    parse_stdout_progress: bool,
    events: mpsc::UnboundedSender<CommandEvent>,
    result_tx: oneshot::Sender<ExecutionResult>,
) {
    while let Some(signal) = handle.next_signal().await {
        if parse_stdout_progress {
            if let ProcessSignal::StdoutData(OutputChunk::Line(line)) = &signal {
                if let Some(progress) = parse_progress(line) {
                    debug!(
                        current = progress.current_frame,
                        total = progress.total_frames,
                        "progress"
                    );
                    let _ = events.send(CommandEvent::Progress(progress));
                }
            }
        }

        let launch_failed = matches!(signal, ProcessSignal::Exited(ExitOutcome::LaunchError(_)));

        if let Some(result) = reconciler.observe(signal) {
            if launch_failed {
                if let Some(err) = &result.error {
                    let _ = events.send(CommandEvent::Error(err.clone()));
                }
            }
            let _ = events.send(CommandEvent::End(result.clone()));
            if result_tx.send(result).is_err() {
                debug!("execution result dropped by caller");
            }
            return;
        }
    }

    warn!("process signals ended before all completion signals were observed");
}

/// A running (non-blocking) gifski execution.
#[derive(Debug)]
pub struct Execution {
    events: mpsc::UnboundedReceiver<CommandEvent>,
    result: oneshot::Receiver<ExecutionResult>,
    terminate: Option<oneshot::Sender<KillSignal>>,
    pid: Option<u32>,
}

impl Execution {
    /// OS process id, or `None` if the process failed to start.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Next notification; `None` after `CommandEvent::End` was delivered.
    pub async fn next_event(&mut self) -> Option<CommandEvent> {
        self.events.recv().await
    }

    /// Send `signal` to the process. The resulting exit is reported as
    /// `ProcessKilled`. Returns `false` if the process is already gone or a
    /// signal was already sent.
    pub fn terminate(&mut self, signal: KillSignal) -> bool {
        match self.terminate.take() {
            Some(tx) => tx.send(signal).is_ok(),
            None => false,
        }
    }

    /// Wait for the final result.
    pub async fn wait(self) -> Result<ExecutionResult> {
        self.result.await.map_err(|_| {
            GifskiError::Other(anyhow!("execution ended without producing a result"))
        })
    }

    /// Drain notifications, calling `on_progress` for each progress marker,
    /// then return the final result.
    pub async fn wait_with_progress<F>(mut self, mut on_progress: F) -> Result<ExecutionResult>
    where
        F: FnMut(&ProgressEvent),
    {
        while let Some(event) = self.events.recv().await {
            match event {
                CommandEvent::Progress(progress) => on_progress(&progress),
                CommandEvent::Error(err) => debug!(error = %err, "launch error notification"),
                CommandEvent::End(_) => break,
            }
        }
        self.wait().await
    }
}
