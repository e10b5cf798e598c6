// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod frames;
pub mod locate;
pub mod logging;

use std::io::Write;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{EncodeOptions, RawEncodeOptions, load_from_path};
use crate::errors::GifskiError;
use crate::exec::GifskiCommand;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config file + flag merging
/// - frame glob expansion
/// - gifski executable discovery
/// - the non-blocking execution with progress reporting
pub async fn run(args: CliArgs) -> Result<()> {
    let base = match &args.config {
        Some(path) => load_from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RawEncodeOptions::default(),
    };
    let mut raw = args.merge_into(base);

    if args.pattern.trim().is_empty() {
        return Err(GifskiError::ConfigurationInvalid(
            "empty glob pattern of PNG image files".to_string(),
        )
        .into());
    }
    raw.frames = frames::expand_pattern(&args.pattern)?;
    if raw.output != config::STDOUT_SENTINEL && !raw.output.trim().is_empty() {
        raw.output = std::path::absolute(&raw.output)
            .with_context(|| format!("resolving output path {}", raw.output))?
            .to_string_lossy()
            .into_owned();
    }

    let chatty = raw.output != config::STDOUT_SENTINEL && !raw.quiet;
    let found = raw.frames.len();
    if chatty {
        eprintln!("{found} PNG image file{} found!", plural(found));
    }

    let options = EncodeOptions::try_from(raw)?;
    let program = locate::resolve_executable(args.gifski.as_deref())?;
    let command = GifskiCommand::new(program, options);
    info!(program = %command.program().display(), "using gifski");
    let execution = command.start();

    let result = execution
        .wait_with_progress(|progress| {
            if chatty {
                eprintln!(
                    "Convert to .gif: {}/{} ({:.0}%)",
                    progress.current_frame, progress.total_frames, progress.percent
                );
            }
        })
        .await?;

    if let Some(err) = result.error {
        bail!(err);
    }

    let output = command.options().output();
    if output.is_stdout() {
        if let Some(bytes) = result.stdout.as_bytes() {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("writing GIF to stdout")?;
            stdout.flush().context("flushing stdout")?;
        }
    } else if let Some(path) = output.file_path() {
        if chatty {
            eprintln!("{found} PNG image file{} converted with success.", plural(found));
            eprintln!("GIF saved at: {}", path.display());
        }
    }

    debug!("run complete");
    Ok(())
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
