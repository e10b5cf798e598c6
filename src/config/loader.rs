// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{EncodeOptions, RawEncodeOptions};
use crate::errors::Result;

/// Load encoding options from a TOML file without validating them.
///
/// The CLI uses this form because `output` and `frames` usually come from
/// the command line and are merged in afterwards.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawEncodeOptions> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let options: RawEncodeOptions = toml::from_str(&contents)?;

    Ok(options)
}

/// Load encoding options from a TOML file and validate them.
///
/// The file must then contain `output` and `frames` itself.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<EncodeOptions> {
    let raw = load_from_path(&path)?;
    let options = EncodeOptions::try_from(raw)?;
    Ok(options)
}
