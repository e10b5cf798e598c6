// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::RawEncodeOptions;

/// Command-line arguments for `gifski-command`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gifski-command",
    version,
    about = "Convert PNG frames to an animated GIF with gifski.",
    after_help = "Examples:\n  \
        gifski-command -Q 100 -o ./video.gif './frames/**/video.mp4.frame*.png'\n  \
        gifski-command -o - './frames/**/video.mp4.frame*.png' > ./video.gif"
)]
pub struct CliArgs {
    /// Glob pattern of PNG image files. Quote it so the shell doesn't expand
    /// it (example './frames/**/*.png').
    #[arg(value_name = "PATTERN")]
    pub pattern: String,

    /// Destination file to write to; "-" means stdout.
    #[arg(short, long, value_name = "a.gif")]
    pub output: String,

    /// Frame rate of animation. All frames are kept. [gifski default: 20]
    #[arg(short = 'r', long, value_name = "NUM")]
    pub fps: Option<u32>,

    /// 50% faster encoding, but 10% worse quality and larger file size.
    #[arg(long)]
    pub fast: bool,

    /// 50% slower encoding, but 1% better quality.
    #[arg(long)]
    pub extra: bool,

    /// Lower quality may give smaller file. [gifski default: 90]
    #[arg(short = 'Q', long, value_name = "1-100", value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Maximum width. By default anims are limited to about 800x600.
    #[arg(short = 'W', long, value_name = "PX")]
    pub width: Option<u32>,

    /// Maximum height (stretches if the width is also set).
    #[arg(short = 'H', long, value_name = "PX")]
    pub height: Option<u32>,

    /// Use files exactly in the order given, rather than sorted.
    #[arg(long)]
    pub no_sort: bool,

    /// Do not display anything on standard output/console.
    #[arg(short, long)]
    pub quiet: bool,

    /// Number of times the animation is repeated (-1 none, 0 forever or
    /// <value> repetitions).
    #[arg(long, value_name = "NUM", allow_hyphen_values = true)]
    pub repeat: Option<i32>,

    /// Maximum number of gifski stdout/stderr lines kept in memory
    /// (0 keeps everything). [default: 100]
    #[arg(long, value_name = "N")]
    pub log_lines: Option<usize>,

    /// TOML file with default encoding options; flags override it.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the gifski executable (otherwise GIFSKI_PATH, the bundled
    /// binary, or PATH is used).
    #[arg(long, value_name = "PATH")]
    pub gifski: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GIFSKI_COMMAND_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// Overlay command-line values on top of `base` (e.g. from `--config`).
    ///
    /// Boolean flags can only switch options on.
    pub fn merge_into(&self, mut base: RawEncodeOptions) -> RawEncodeOptions {
        base.output = self.output.clone();
        base.fps = self.fps.or(base.fps);
        base.fast |= self.fast;
        base.extra |= self.extra;
        base.quality = self.quality.or(base.quality);
        base.width = self.width.or(base.width);
        base.height = self.height.or(base.height);
        base.no_sort |= self.no_sort;
        base.quiet |= self.quiet;
        base.repeat = self.repeat.or(base.repeat);
        if let Some(lines) = self.log_lines {
            base.log_lines = lines;
        }
        base
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
