#![allow(dead_code)]

use std::path::{Path, PathBuf};

use gifski_command::config::{EncodeOptions, RawEncodeOptions};

/// Builder for `EncodeOptions` to simplify test setup.
pub struct EncodeOptionsBuilder {
    raw: RawEncodeOptions,
}

impl EncodeOptionsBuilder {
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            raw: RawEncodeOptions {
                output: output.as_ref().to_string_lossy().into_owned(),
                ..RawEncodeOptions::default()
            },
        }
    }

    /// Output to the stdout sentinel (`-`).
    pub fn to_stdout() -> Self {
        Self::new("-")
    }

    pub fn frame(mut self, path: impl Into<PathBuf>) -> Self {
        self.raw.frames.push(path.into());
        self
    }

    pub fn frames<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.raw.frames.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn fps(mut self, fps: u32) -> Self {
        self.raw.fps = Some(fps);
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.raw.quality = Some(quality);
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.raw.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.raw.height = Some(height);
        self
    }

    pub fn fast(mut self, val: bool) -> Self {
        self.raw.fast = val;
        self
    }

    pub fn extra(mut self, val: bool) -> Self {
        self.raw.extra = val;
        self
    }

    pub fn no_sort(mut self, val: bool) -> Self {
        self.raw.no_sort = val;
        self
    }

    pub fn quiet(mut self, val: bool) -> Self {
        self.raw.quiet = val;
        self
    }

    pub fn repeat(mut self, repeat: i32) -> Self {
        self.raw.repeat = Some(repeat);
        self
    }

    pub fn log_lines(mut self, lines: usize) -> Self {
        self.raw.log_lines = lines;
        self
    }

    pub fn raw(self) -> RawEncodeOptions {
        self.raw
    }

    pub fn build(self) -> EncodeOptions {
        EncodeOptions::try_from(self.raw).expect("Failed to build valid options from builder")
    }
}
