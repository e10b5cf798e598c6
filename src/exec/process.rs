// src/exec/process.rs

//! Spawned gifski process and its notification channel.
//!
//! A [`ProcessHandle`] owns one child process. Three independent producer
//! tasks feed a single unbounded channel:
//!
//! - the stdout reader (`StdoutData*` then exactly one `StdoutClosed`)
//! - the stderr reader (`StderrData*` then exactly one `StderrClosed`)
//! - the exit waiter (exactly one `Exited`)
//!
//! Order is preserved within each producer; across producers signals may
//! interleave arbitrarily. If the process cannot be spawned, the only
//! signal ever delivered is `Exited(ExitOutcome::LaunchError)`.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

const RAW_CHUNK_SIZE: usize = 8 * 1024;

/// How stdout is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdoutMode {
    /// Diagnostic / progress text, delivered line by line.
    Lines,
    /// Binary payload (the encoded GIF), delivered as raw chunks.
    Raw,
}

/// How the blocking execution path wires the child's stdio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockingStdio {
    /// Child writes straight to this process's stdout/stderr; nothing is
    /// captured.
    #[default]
    Inherit,
    /// Child output is collected and returned in the result.
    Capture,
}

/// Extra process options applied at spawn time.
#[derive(Debug, Clone, Default)]
pub struct SpawnOptions {
    pub current_dir: Option<PathBuf>,
    pub envs: Vec<(OsString, OsString)>,
    pub blocking_stdio: BlockingStdio,
}

impl SpawnOptions {
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    pub fn blocking_stdio(mut self, stdio: BlockingStdio) -> Self {
        self.blocking_stdio = stdio;
        self
    }

    pub(crate) fn apply_std(&self, cmd: &mut std::process::Command) {
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        for (k, v) in &self.envs {
            cmd.env(k, v);
        }
    }
}

/// One unit of stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputChunk {
    Line(String),
    Bytes(Vec<u8>),
}

/// How the process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    Code(i32),
    /// Terminated by a signal, e.g. `"SIGKILL"`.
    Signal(String),
    /// The process never started.
    LaunchError(String),
}

impl ExitOutcome {
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitOutcome::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(sig) = status.signal() {
                return ExitOutcome::Signal(signal_name(sig));
            }
        }
        ExitOutcome::Code(-1)
    }
}

/// Notification produced by a running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessSignal {
    StdoutData(OutputChunk),
    StdoutClosed,
    StderrData(String),
    StderrClosed,
    Exited(ExitOutcome),
}

/// Signal a caller can send to a running process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KillSignal {
    /// SIGINT
    Int,
    /// SIGTERM
    #[default]
    Term,
    /// SIGKILL
    Kill,
}

/// A spawned (or failed-to-spawn) gifski process.
#[derive(Debug)]
pub struct ProcessHandle {
    signals: mpsc::UnboundedReceiver<ProcessSignal>,
    terminate: Option<oneshot::Sender<KillSignal>>,
    pid: Option<u32>,
}

impl ProcessHandle {
    /// Spawn `program` with `args`.
    ///
    /// Never fails: a spawn error is reported as the single
    /// `Exited(LaunchError)` signal. Must be called within a Tokio runtime.
    pub fn spawn(
        program: &Path,
        args: &[OsString],
        options: &SpawnOptions,
        stdout_mode: StdoutMode,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        options.apply_std(cmd.as_std_mut());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %program.display(), error = %e, "failed to spawn process");
                let _ = tx.send(ProcessSignal::Exited(ExitOutcome::LaunchError(e.to_string())));
                return Self {
                    signals: rx,
                    terminate: None,
                    pid: None,
                };
            }
        };

        let pid = child.id();
        info!(program = %program.display(), pid, "spawned process");

        match child.stdout.take() {
            Some(stdout) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    match stdout_mode {
                        StdoutMode::Lines => {
                            read_lines(stdout, "stdout", |line| {
                                tx.send(ProcessSignal::StdoutData(OutputChunk::Line(line)))
                                    .is_ok()
                            })
                            .await
                        }
                        StdoutMode::Raw => read_raw(stdout, &tx).await,
                    }
                    let _ = tx.send(ProcessSignal::StdoutClosed);
                });
            }
            None => {
                let _ = tx.send(ProcessSignal::StdoutClosed);
            }
        }

        match child.stderr.take() {
            Some(stderr) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    read_lines(stderr, "stderr", |line| {
                        tx.send(ProcessSignal::StderrData(line)).is_ok()
                    })
                    .await;
                    let _ = tx.send(ProcessSignal::StderrClosed);
                });
            }
            None => {
                let _ = tx.send(ProcessSignal::StderrClosed);
            }
        }

        let (term_tx, term_rx) = oneshot::channel();
        tokio::spawn(wait_for_exit(child, term_rx, tx));

        Self {
            signals: rx,
            terminate: Some(term_tx),
            pid,
        }
    }

    /// OS process id, if the process started.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Next signal, or `None` once all producers are done.
    pub async fn next_signal(&mut self) -> Option<ProcessSignal> {
        self.signals.recv().await
    }

    /// Detach the terminate sender so it can be used independently of the
    /// signal receiver.
    pub(crate) fn take_terminator(&mut self) -> Option<oneshot::Sender<KillSignal>> {
        self.terminate.take()
    }
}

async fn wait_for_exit(
    mut child: Child,
    mut terminate: oneshot::Receiver<KillSignal>,
    tx: mpsc::UnboundedSender<ProcessSignal>,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        Ok(signal) = &mut terminate => {
            info!(pid = child.id(), ?signal, "termination requested; signalling process");
            send_kill_signal(&mut child, signal);
            child.wait().await
        }
    };

    let outcome = match status {
        Ok(status) => ExitOutcome::from_status(status),
        Err(e) => {
            warn!(error = %e, "failed to wait for process; treating as exit code -1");
            ExitOutcome::Code(-1)
        }
    };

    info!(?outcome, "process exited");
    let _ = tx.send(ProcessSignal::Exited(outcome));
}

fn send_kill_signal(child: &mut Child, signal: KillSignal) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        let sig = match signal {
            KillSignal::Int => Some(Signal::SIGINT),
            KillSignal::Term => Some(Signal::SIGTERM),
            KillSignal::Kill => None,
        };
        if let (Some(sig), Some(pid)) = (sig, child.id()) {
            let Ok(raw_pid) = i32::try_from(pid) else {
                warn!(pid, "pid out of range; falling back to kill");
                let _ = child.start_kill();
                return;
            };
            if let Err(e) = kill(Pid::from_raw(raw_pid), sig) {
                warn!(pid, error = %e, "failed to send {sig}");
            }
            return;
        }
    }

    #[cfg(not(unix))]
    let _ = signal;

    if let Err(e) = child.start_kill() {
        warn!(error = %e, "failed to kill process");
    }
}

/// Read `reader` as text and hand each non-empty segment to `emit` as soon
/// as a `\n` or `\r` ends it; gifski redraws its progress bar with bare
/// `\r`. The unterminated tail is flushed at EOF. Stops early if `emit`
/// returns `false`.
async fn read_lines<R, F>(reader: R, stream: &'static str, mut emit: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(String) -> bool,
{
    let mut reader = BufReader::new(reader);
    let mut pending = Vec::new();

    loop {
        let available = match reader.fill_buf().await {
            Ok([]) => break,
            Ok(buf) => buf,
            Err(e) => {
                warn!(stream, error = %e, "read error; treating stream as closed");
                break;
            }
        };
        let consumed = available.len();
        for &byte in available {
            if byte == b'\n' || byte == b'\r' {
                if !flush_segment(&mut pending, stream, &mut emit) {
                    return;
                }
            } else {
                pending.push(byte);
            }
        }
        reader.consume(consumed);
    }

    flush_segment(&mut pending, stream, &mut emit);
    debug!(stream, "stream closed");
}

fn flush_segment<F>(pending: &mut Vec<u8>, stream: &'static str, emit: &mut F) -> bool
where
    F: FnMut(String) -> bool,
{
    if pending.is_empty() {
        return true;
    }
    let line = String::from_utf8_lossy(pending).into_owned();
    pending.clear();
    debug!(stream, "{}", line);
    emit(line)
}

async fn read_raw<R>(mut reader: R, tx: &mpsc::UnboundedSender<ProcessSignal>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; RAW_CHUNK_SIZE];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let chunk = buf.get(..n).map(<[u8]>::to_vec).unwrap_or_default();
                if tx
                    .send(ProcessSignal::StdoutData(OutputChunk::Bytes(chunk)))
                    .is_err()
                {
                    return;
                }
            }
            Err(e) => {
                warn!(stream = "stdout", error = %e, "read error; treating stream as closed");
                break;
            }
        }
    }
    debug!(stream = "stdout", "stream closed");
}

/// Conventional name of a Unix signal number, e.g. `9` → `"SIGKILL"`.
#[cfg(unix)]
pub fn signal_name(sig: i32) -> String {
    match nix::sys::signal::Signal::try_from(sig) {
        Ok(signal) => signal.as_str().to_string(),
        Err(_) => {
            warn!(signal = sig, "unknown signal number");
            format!("SIG{sig}")
        }
    }
}
