// src/config/mod.rs

//! Execution configuration.
//!
//! - [`model`] holds the raw (deserializable) and validated option types.
//! - [`validate`] turns raw options into [`EncodeOptions`].
//! - [`loader`] reads options from a TOML file.
//! - [`args`] renders validated options into gifski command-line arguments.

pub mod args;
pub mod loader;
pub mod model;
pub mod validate;

pub use args::build_spawn_args;
pub use loader::{load_and_validate, load_from_path};
pub use model::{DEFAULT_LOG_LINES, EncodeOptions, Output, RawEncodeOptions, STDOUT_SENTINEL};
