// src/exec/progress.rs

//! Extraction of progress markers from gifski stdout.
//!
//! gifski reports progress with lines like:
//!
//! ```text
//! Frame 12 / 40  ##########_____________________  4s
//! ```
//!
//! Parsing is best-effort: anything that does not look like a well-formed
//! marker yields no event and never an error.

use std::sync::LazyLock;

use regex::Regex;

static FRAME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Frame (\d+) / (\d+)\b(.*)$").expect("frame marker regex is valid")
});

static SECONDS_LEFT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)s\b").expect("seconds-left regex is valid"));

/// One progress notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressEvent {
    /// 1-based index of the frame being processed.
    pub current_frame: u32,
    pub total_frames: u32,
    /// `current_frame / total_frames * 100`.
    pub percent: f64,
    /// Encoder's estimate; 0 when it did not print one.
    pub seconds_left: u64,
}

/// Parse the first progress marker found in `chunk`.
///
/// `chunk` may contain several lines separated by `\n` or `\r`; each is
/// trimmed and matched independently and the first match wins.
pub fn parse_progress(chunk: &str) -> Option<ProgressEvent> {
    chunk
        .split(['\n', '\r'])
        .map(str::trim)
        .find_map(|line| FRAME_LINE.captures(line))
        .and_then(|caps| {
            let current_frame: u32 = caps.get(1)?.as_str().parse().ok()?;
            let total_frames: u32 = caps.get(2)?.as_str().parse().ok()?;
            if total_frames == 0 || current_frame == 0 {
                return None;
            }

            let tail = caps.get(3).map_or("", |m| m.as_str());
            let seconds_left = SECONDS_LEFT
                .captures_iter(tail)
                .last()
                .and_then(|c| c.get(1)?.as_str().parse().ok())
                .unwrap_or(0);

            Some(ProgressEvent {
                current_frame,
                total_frames,
                percent: f64::from(current_frame) / f64::from(total_frames) * 100.0,
                seconds_left,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_marker_with_seconds_left() {
        let ev = parse_progress("Frame 12 / 40  ##########__________  4s").unwrap();
        assert_eq!(ev.current_frame, 12);
        assert_eq!(ev.total_frames, 40);
        assert_eq!(ev.seconds_left, 4);
        assert!((ev.percent - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn seconds_left_defaults_to_zero() {
        let ev = parse_progress("Frame 1 / 2").unwrap();
        assert_eq!(ev.seconds_left, 0);
        assert!((ev.percent - 50.0).abs() < f64::EPSILON);

        let ev = parse_progress("Frame 3 / 4 ####____").unwrap();
        assert_eq!(ev.seconds_left, 0);
    }

    #[test]
    fn first_marker_in_chunk_wins() {
        let chunk = "loading frames\nFrame 2 / 9 1s\rFrame 3 / 9 0s\n";
        let ev = parse_progress(chunk).unwrap();
        assert_eq!(ev.current_frame, 2);
        assert_eq!(ev.seconds_left, 1);
    }

    #[test]
    fn marker_must_start_the_line() {
        assert!(parse_progress("note: Frame 1 / 2").is_none());
        assert!(parse_progress("  Frame 1 / 2  ").is_some());
    }

    #[test]
    fn malformed_markers_yield_no_event() {
        assert!(parse_progress("").is_none());
        assert!(parse_progress("Frame x / 2").is_none());
        assert!(parse_progress("Frame 1 / 0").is_none());
        assert!(parse_progress("Frame 0 / 10").is_none());
        assert!(parse_progress("Frame 1 / 99999999999999999999").is_none());
        assert!(parse_progress("gifski created out.gif").is_none());
    }

    #[test]
    fn total_glued_to_text_is_malformed() {
        assert!(parse_progress("Frame 1 / 40abc").is_none());
        assert!(parse_progress("Frame 1 / 4_0").is_none());
        assert_eq!(parse_progress("Frame 1 / 40#__ 3s").unwrap().total_frames, 40);
    }
}
