// src/frames.rs

//! Expansion of a frame glob pattern (e.g. `'./frames/**/*.png'`) into the
//! list of frame files handed to gifski.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::errors::Result;

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Expand `pattern` into absolute, sorted file paths.
///
/// `*` does not cross directory separators; `**` does. Walking starts at the
/// longest leading part of the pattern without glob metacharacters, so
/// `frames/**/*.png` only reads below `frames/`. A pattern without any
/// metacharacters names a single file.
pub fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let (base, has_meta) = literal_base(pattern);

    if !has_meta {
        let path = PathBuf::from(pattern);
        return if path.is_file() {
            Ok(vec![absolute(&path)?])
        } else {
            Ok(Vec::new())
        };
    }

    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern '{pattern}'"))?
        .compile_matcher();

    let mut matches = Vec::new();
    let io_root = if base.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        base.clone()
    };
    if io_root.is_dir() {
        walk(&io_root, &base, &matcher, &mut matches)?;
    }

    let mut frames = matches
        .iter()
        .map(|p| absolute(p))
        .collect::<Result<Vec<_>>>()?;
    frames.sort();
    debug!(pattern, count = frames.len(), "expanded frame pattern");
    Ok(frames)
}

/// Split off the leading components of `pattern` that contain no glob
/// metacharacters. Returns the base and whether any metacharacter exists.
fn literal_base(pattern: &str) -> (PathBuf, bool) {
    let mut base = PathBuf::new();
    for component in Path::new(pattern).components() {
        let is_meta = match component {
            Component::Normal(part) => part.to_string_lossy().contains(GLOB_META),
            _ => false,
        };
        if is_meta {
            return (base, true);
        }
        base.push(component);
    }
    (PathBuf::new(), false)
}

/// Recursively collect files under `io_dir` whose pattern-relative path
/// (`rel_dir` joined with the entry name) matches.
fn walk(
    io_dir: &Path,
    rel_dir: &Path,
    matcher: &GlobMatcher,
    out: &mut Vec<PathBuf>,
) -> Result<()> {
    let entries =
        fs::read_dir(io_dir).with_context(|| format!("reading dir {}", io_dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let rel = rel_dir.join(entry.file_name());
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk(&entry.path(), &rel, matcher, out)?;
        } else if matcher.is_match(&rel) {
            out.push(rel);
        }
    }
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)
        .with_context(|| format!("resolving absolute path of {}", path.display()))?)
}
