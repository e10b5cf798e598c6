//! A fake gifski written as a POSIX shell script.
//!
//! It understands the same flags as gifski and behaves like it in the ways
//! the coordinator cares about:
//!
//! - fails with exit code 1 and an `error: ...` line on stderr if a frame
//!   file does not exist
//! - prints one `Frame N / M ... Ks` progress line per frame on stdout when
//!   writing to a file (unless `--quiet`)
//! - writes a GIF-like payload whose size grows with `--quality`, either to
//!   the `-o` file or, for `-o -`, to stdout (including non-UTF-8 bytes)
//!
//! Test hooks via environment variables:
//! - `STUB_SLEEP=<secs>`: `exec sleep` instead of encoding (for cancellation)
//! - `STUB_SELF_SIGNAL=<NAME>`: the script sends itself that signal
//! - `STUB_EXIT=<code>`: print an error to stderr and exit with that code
//! - `STUB_CR_PROGRESS=<secs>`: redraw progress with bare `\r` like the real
//!   encoder, sleeping `<secs>` after each frame, and end with one `\n`

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

const SCRIPT: &str = r#"#!/bin/sh
if [ -n "$STUB_SLEEP" ]; then
  exec sleep "$STUB_SLEEP"
fi
if [ -n "$STUB_SELF_SIGNAL" ]; then
  kill -s "$STUB_SELF_SIGNAL" $$
  sleep 5
fi

out=""
quality=90
quiet=0
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift 2 ;;
    --quality) quality="$2"; shift 2 ;;
    --fps|--width|--height|--repeat) shift 2 ;;
    --quiet) quiet=1; shift ;;
    --*) shift ;;
    *) break ;;
  esac
done

if [ -n "$STUB_EXIT" ]; then
  echo "error: forced failure" >&2
  exit "$STUB_EXIT"
fi

for f in "$@"; do
  if [ ! -f "$f" ]; then
    echo "error: unable to load $f" >&2
    exit 1
  fi
done

total=$#
i=0
for f in "$@"; do
  i=$((i + 1))
  if [ "$quiet" = 0 ] && [ "$out" != "-" ]; then
    if [ -n "$STUB_CR_PROGRESS" ]; then
      printf 'Frame %d / %d ######______ %ds\r' "$i" "$total" "$((total - i))"
      sleep "$STUB_CR_PROGRESS"
    else
      echo "Frame $i / $total ######______ $((total - i))s"
    fi
  fi
done
if [ -n "$STUB_CR_PROGRESS" ] && [ "$quiet" = 0 ] && [ "$out" != "-" ]; then
  printf '\n'
fi

payload() {
  printf 'GIF89a\000\377\376'
  n=0
  while [ $n -lt "$quality" ]; do
    printf '0123456789abcdef'
    n=$((n + 1))
  done
}

if [ "$out" = "-" ]; then
  payload
else
  payload > "$out"
fi
"#;

/// A stub gifski plus a scratch directory for frames and outputs.
pub struct StubEncoder {
    dir: TempDir,
    program: PathBuf,
}

impl StubEncoder {
    /// Write the stub script to a fresh temporary directory as `gifski`.
    pub fn install() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let program = dir.path().join("gifski");
        fs::write(&program, SCRIPT)?;
        make_executable(&program)?;
        tracing::debug!(program = %program.display(), "installed stub gifski");
        Ok(Self { dir, program })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path inside the scratch directory (not created).
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Create `count` fake PNG frames and return their paths, in order.
    pub fn write_frames(&self, count: usize) -> std::io::Result<Vec<PathBuf>> {
        let frames_dir = self.dir.path().join("frames");
        fs::create_dir_all(&frames_dir)?;
        (1..=count)
            .map(|i| -> std::io::Result<PathBuf> {
                let path = frames_dir.join(format!("video.mp4.frame{i:03}.png"));
                fs::write(&path, b"\x89PNG\r\n\x1a\n")?;
                Ok(path)
            })
            .collect()
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
