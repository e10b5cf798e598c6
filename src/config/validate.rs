// src/config/validate.rs

use crate::config::model::{EncodeOptions, Output, RawEncodeOptions};
use crate::errors::{GifskiError, Result};

impl TryFrom<RawEncodeOptions> for EncodeOptions {
    type Error = GifskiError;

    fn try_from(raw: RawEncodeOptions) -> std::result::Result<Self, Self::Error> {
        validate_raw_options(&raw)?;
        Ok(EncodeOptions {
            output: Output::parse(&raw.output),
            frames: raw.frames,
            fps: raw.fps,
            fast: raw.fast,
            extra: raw.extra,
            quality: raw.quality,
            width: raw.width,
            height: raw.height,
            no_sort: raw.no_sort,
            quiet: raw.quiet,
            repeat: raw.repeat,
            log_lines: raw.log_lines,
        })
    }
}

fn validate_raw_options(raw: &RawEncodeOptions) -> Result<()> {
    ensure_has_output(raw)?;
    ensure_has_frames(raw)?;
    validate_quality(raw)?;
    validate_dimensions(raw)?;
    Ok(())
}

fn ensure_has_output(raw: &RawEncodeOptions) -> Result<()> {
    if raw.output.trim().is_empty() {
        return Err(GifskiError::ConfigurationInvalid(
            "empty output destination file path".to_string(),
        ));
    }
    Ok(())
}

fn ensure_has_frames(raw: &RawEncodeOptions) -> Result<()> {
    if raw.frames.is_empty() {
        return Err(GifskiError::ConfigurationInvalid(
            "at least one PNG frame is required".to_string(),
        ));
    }
    if let Some(idx) = raw.frames.iter().position(|f| f.as_os_str().is_empty()) {
        return Err(GifskiError::ConfigurationInvalid(format!(
            "frame #{} has an empty path",
            idx + 1
        )));
    }
    Ok(())
}

fn validate_quality(raw: &RawEncodeOptions) -> Result<()> {
    match raw.quality {
        Some(q) if !(1..=100).contains(&q) => Err(GifskiError::ConfigurationInvalid(format!(
            "quality must be within 1..=100 (got {q})"
        ))),
        _ => Ok(()),
    }
}

fn validate_dimensions(raw: &RawEncodeOptions) -> Result<()> {
    for (name, value) in [("fps", raw.fps), ("width", raw.width), ("height", raw.height)] {
        if value == Some(0) {
            return Err(GifskiError::ConfigurationInvalid(format!(
                "{name} must be >= 1 (got 0)"
            )));
        }
    }
    Ok(())
}
