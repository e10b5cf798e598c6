// src/locate.rs

//! Discovery of the gifski executable.
//!
//! Search order:
//! 1. an explicit path (e.g. `--gifski`)
//! 2. the `GIFSKI_PATH` environment variable
//! 3. `bin/<platform>/gifski[.exe]` next to the running executable, or one
//!    directory up
//! 4. `gifski` on `PATH`
//!
//! Resolution happens once, at startup; the result is injected into
//! [`GifskiCommand`](crate::exec::GifskiCommand).

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{GifskiError, Result};

pub const GIFSKI_PATH_ENV: &str = "GIFSKI_PATH";

/// Path of the bundled binary below a `bin/` directory for `os`
/// (as reported by `std::env::consts::OS`).
pub fn platform_subpath(os: &str) -> Result<PathBuf> {
    let sub = match os {
        "windows" => Path::new("windows").join("gifski.exe"),
        "macos" => Path::new("macos").join("gifski"),
        "linux" => Path::new("linux").join("gifski"),
        other => {
            return Err(GifskiError::ExecutableNotFound(format!(
                "no gifski build for platform {other}"
            )));
        }
    };
    Ok(sub)
}

/// Candidate bundled locations for `os` relative to the directory holding
/// the running executable.
pub fn bundled_candidates(exe_dir: &Path, os: &str) -> Result<Vec<PathBuf>> {
    let sub = platform_subpath(os)?;
    let mut candidates = vec![exe_dir.join("bin").join(&sub)];
    if let Some(parent) = exe_dir.parent() {
        candidates.push(parent.join("bin").join(&sub));
    }
    Ok(candidates)
}

/// Resolve the gifski executable, failing fast if none can be found.
pub fn resolve_executable(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return require_file(path, "explicit path");
    }

    if let Some(path) = env::var_os(GIFSKI_PATH_ENV) {
        return require_file(Path::new(&path), GIFSKI_PATH_ENV);
    }

    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    if let Some(dir) = exe_dir {
        for candidate in bundled_candidates(&dir, env::consts::OS)? {
            debug!(candidate = %candidate.display(), "checking bundled gifski");
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    which::which("gifski").map_err(|e| {
        GifskiError::ExecutableNotFound(format!("gifski is not bundled and not on PATH ({e})"))
    })
}

fn require_file(path: &Path, source: &str) -> Result<PathBuf> {
    if path.is_file() {
        debug!(path = %path.display(), source, "using gifski executable");
        Ok(path.to_path_buf())
    } else {
        Err(GifskiError::ExecutableNotFound(format!(
            "{} (from {source}) does not exist",
            path.display()
        )))
    }
}
