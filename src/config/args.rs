// src/config/args.rs

use std::ffi::OsString;

use crate::config::model::{EncodeOptions, Output, STDOUT_SENTINEL};

/// Build the gifski argument vector for the given options.
///
/// Flag order is fixed: `--fps --fast --extra --quality --width --height
/// --no-sort --quiet --repeat -o <output> <frames...>`. Unset options are
/// omitted and gifski applies its own defaults.
pub fn build_spawn_args(options: &EncodeOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();

    if let Some(fps) = options.fps {
        args.push("--fps".into());
        args.push(fps.to_string().into());
    }
    if options.fast {
        args.push("--fast".into());
    }
    if options.extra {
        args.push("--extra".into());
    }
    if let Some(quality) = options.quality {
        args.push("--quality".into());
        args.push(quality.to_string().into());
    }
    if let Some(width) = options.width {
        args.push("--width".into());
        args.push(width.to_string().into());
    }
    if let Some(height) = options.height {
        args.push("--height".into());
        args.push(height.to_string().into());
    }
    if options.no_sort {
        args.push("--no-sort".into());
    }
    if options.quiet {
        args.push("--quiet".into());
    }
    if let Some(repeat) = options.repeat {
        args.push("--repeat".into());
        args.push(repeat.to_string().into());
    }

    args.push("-o".into());
    match &options.output {
        Output::File(path) => args.push(path.clone().into_os_string()),
        Output::Stdout => args.push(STDOUT_SENTINEL.into()),
    }
    args.extend(options.frames.iter().map(|f| f.clone().into_os_string()));

    args
}
