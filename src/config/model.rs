// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Value of `output` that means "write the encoded GIF to stdout".
pub const STDOUT_SENTINEL: &str = "-";

/// Default number of stdout/stderr lines kept in memory per execution.
pub const DEFAULT_LOG_LINES: usize = 100;

/// Encoding options as read from a TOML file or filled in by a caller.
///
/// This is the unvalidated form; turn it into [`EncodeOptions`] with
/// `EncodeOptions::try_from(raw)` before running anything.
///
/// ```toml
/// output = "out/anim.gif"
/// frames = ["frames/0001.png", "frames/0002.png"]
/// fps = 20
/// quality = 90
/// width = 640
/// log_lines = 100
/// ```
///
/// Every field is optional in the file; `output` and `frames` are usually
/// supplied on the command line instead.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RawEncodeOptions {
    /// Destination file; `"-"` means stdout.
    #[serde(default)]
    pub output: String,

    /// PNG frame files, in the order they should be passed to gifski.
    #[serde(default)]
    pub frames: Vec<PathBuf>,

    /// Frame rate of the animation.
    #[serde(default)]
    pub fps: Option<u32>,

    /// 50% faster encoding, slightly worse quality.
    #[serde(default)]
    pub fast: bool,

    /// 50% slower encoding, slightly better quality.
    #[serde(default)]
    pub extra: bool,

    /// 1-100; lower quality may give a smaller file.
    #[serde(default)]
    pub quality: Option<u8>,

    /// Maximum width in pixels.
    #[serde(default)]
    pub width: Option<u32>,

    /// Maximum height in pixels.
    #[serde(default)]
    pub height: Option<u32>,

    /// Use frames exactly in the given order instead of sorting them.
    #[serde(default)]
    pub no_sort: bool,

    /// Ask gifski not to print anything on stdout.
    #[serde(default)]
    pub quiet: bool,

    /// -1 plays once, 0 loops forever, N repeats N times.
    #[serde(default)]
    pub repeat: Option<i32>,

    /// Max stdout/stderr lines kept in memory; 0 keeps everything.
    #[serde(default = "default_log_lines")]
    pub log_lines: usize,
}

fn default_log_lines() -> usize {
    DEFAULT_LOG_LINES
}

impl Default for RawEncodeOptions {
    fn default() -> Self {
        Self {
            output: String::new(),
            frames: Vec::new(),
            fps: None,
            fast: false,
            extra: false,
            quality: None,
            width: None,
            height: None,
            no_sort: false,
            quiet: false,
            repeat: None,
            log_lines: default_log_lines(),
        }
    }
}

/// Where the encoded animation goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// A real file path.
    File(PathBuf),
    /// The encoder's stdout; the bytes end up in the execution result.
    Stdout,
}

impl Output {
    /// Parse the textual form used by gifski (`"-"` is stdout).
    pub fn parse(s: &str) -> Self {
        if s == STDOUT_SENTINEL {
            Output::Stdout
        } else {
            Output::File(PathBuf::from(s))
        }
    }

    pub fn is_stdout(&self) -> bool {
        matches!(self, Output::Stdout)
    }

    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Output::File(path) => Some(path),
            Output::Stdout => None,
        }
    }
}

/// Validated, immutable encoding options for one execution.
///
/// Guarantees: output is non-empty, at least one frame, quality (if set) is
/// within 1..=100, and fps/width/height (if set) are nonzero.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOptions {
    pub(crate) output: Output,
    pub(crate) frames: Vec<PathBuf>,
    pub(crate) fps: Option<u32>,
    pub(crate) fast: bool,
    pub(crate) extra: bool,
    pub(crate) quality: Option<u8>,
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) no_sort: bool,
    pub(crate) quiet: bool,
    pub(crate) repeat: Option<i32>,
    pub(crate) log_lines: usize,
}

impl EncodeOptions {
    /// Validated options with only an output and a frame list; everything
    /// else uses gifski's defaults.
    pub fn new<I, P>(output: &str, frames: I) -> crate::errors::Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::try_from(RawEncodeOptions {
            output: output.to_string(),
            frames: frames.into_iter().map(Into::into).collect(),
            ..RawEncodeOptions::default()
        })
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn frames(&self) -> &[PathBuf] {
        &self.frames
    }

    pub fn fps(&self) -> Option<u32> {
        self.fps
    }

    pub fn fast(&self) -> bool {
        self.fast
    }

    pub fn extra(&self) -> bool {
        self.extra
    }

    pub fn quality(&self) -> Option<u8> {
        self.quality
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn no_sort(&self) -> bool {
        self.no_sort
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    pub fn repeat(&self) -> Option<i32> {
        self.repeat
    }

    /// Retention limit for captured lines; 0 means unbounded.
    pub fn log_lines(&self) -> usize {
        self.log_lines
    }
}
