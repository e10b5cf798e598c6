use proptest::prelude::*;

use gifski_command::exec::{LogBuffer, parse_progress};

// Well-formed gifski progress lines: `Frame N / M <bar> [Ks]`.
fn progress_line_strategy() -> impl Strategy<Value = (u32, u32, Option<u64>, String)> {
    (1u32..10_000)
        .prop_flat_map(|total| (1..=total, Just(total)))
        .prop_flat_map(|(current, total)| {
            (
                Just(current),
                Just(total),
                proptest::option::of(0u64..100_000),
                "[#_]{0,40}",
            )
        })
}

proptest! {
    #[test]
    fn well_formed_lines_parse_within_bounds(
        (current, total, secs, bar) in progress_line_strategy()
    ) {
        let line = match secs {
            Some(s) => format!("Frame {current} / {total} {bar} {s}s"),
            None => format!("Frame {current} / {total} {bar}"),
        };

        let event = parse_progress(&line).expect("well-formed line parses");
        prop_assert_eq!(event.current_frame, current);
        prop_assert_eq!(event.total_frames, total);
        prop_assert!(event.current_frame <= event.total_frames);
        prop_assert!((0.0..=100.0).contains(&event.percent));
        prop_assert_eq!(event.seconds_left, secs.unwrap_or(0));
    }

    #[test]
    fn arbitrary_chunks_never_panic(chunk in any::<String>()) {
        if let Some(event) = parse_progress(&chunk) {
            prop_assert!(event.current_frame >= 1);
            prop_assert!(event.total_frames >= 1);
            prop_assert!(event.percent >= 0.0);
        }
    }

    #[test]
    fn log_buffer_keeps_the_latest_entries(
        limit in 1usize..20,
        items in proptest::collection::vec(any::<u16>(), 0..100)
    ) {
        let mut buf = LogBuffer::new(limit);
        for item in &items {
            buf.append(*item);
        }

        let expected: Vec<u16> = items
            .iter()
            .skip(items.len().saturating_sub(limit))
            .copied()
            .collect();
        let kept: Vec<u16> = buf.iter().copied().collect();

        prop_assert!(buf.len() <= limit);
        prop_assert_eq!(kept, expected);
    }
}
