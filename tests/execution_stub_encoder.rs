// tests/execution_stub_encoder.rs
//
// End-to-end runs of the non-blocking coordinator against a stub gifski
// shell script.
#![cfg(unix)]

use std::error::Error;
use std::time::{Duration, Instant};

use gifski_command::errors::ExecError;
use gifski_command::exec::{
    CapturedOutput, CommandEvent, ExecutionResult, GifskiCommand, KillSignal, SpawnOptions,
};
use gifski_command_test_utils::builders::EncodeOptionsBuilder;
use gifski_command_test_utils::stub_encoder::StubEncoder;
use gifski_command_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

/// Collect every notification up to and including `End`.
async fn collect_events(command: &GifskiCommand) -> (Vec<CommandEvent>, ExecutionResult) {
    let mut execution = command.start();
    let mut events = Vec::new();
    while let Some(event) = execution.next_event().await {
        let is_end = matches!(event, CommandEvent::End(_));
        events.push(event);
        if is_end {
            break;
        }
    }
    let result = execution.wait().await.expect("execution produced a result");
    (events, result)
}

fn expected_payload(quality: usize) -> Vec<u8> {
    let mut bytes = b"GIF89a\x00\xff\xfe".to_vec();
    for _ in 0..quality {
        bytes.extend_from_slice(b"0123456789abcdef");
    }
    bytes
}

#[tokio::test]
async fn successful_run_writes_output_and_captures_stdout_text() -> TestResult {
    init_tracing();

    let stub = StubEncoder::install()?;
    let frames = stub.write_frames(3)?;
    let output = stub.path("video.gif");
    let options = EncodeOptionsBuilder::new(&output).frames(frames).build();

    let result = with_timeout(GifskiCommand::new(stub.program(), options).run()).await?;

    assert!(result.is_success(), "unexpected error: {:?}", result.error);
    assert!(output.is_file());
    assert_eq!(std::fs::read(&output)?, expected_payload(90));

    let stdout = result.stdout.as_text().expect("text stdout");
    assert_eq!(stdout.lines().count(), 3);
    assert!(stdout.starts_with("Frame 1 / 3"));
    assert!(result.stderr.is_none());

    Ok(())
}

#[tokio::test]
async fn progress_events_precede_a_single_end_event() -> TestResult {
    init_tracing();

    let stub = StubEncoder::install()?;
    let frames = stub.write_frames(4)?;
    let options = EncodeOptionsBuilder::new(stub.path("video.gif"))
        .frames(frames)
        .build();
    let command = GifskiCommand::new(stub.program(), options);

    let (events, result) = with_timeout(collect_events(&command)).await;

    let progress: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            CommandEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(progress.len(), 4);
    for (i, p) in progress.iter().enumerate() {
        assert_eq!(p.current_frame as usize, i + 1);
        assert_eq!(p.total_frames, 4);
        assert_eq!(p.seconds_left as usize, 3 - i);
    }
    assert!((progress[3].percent - 100.0).abs() < f64::EPSILON);

    let ends: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, CommandEvent::End(_)))
        .collect();
    assert_eq!(ends.len(), 1);
    assert!(matches!(events.last(), Some(CommandEvent::End(r)) if *r == result));
    assert!(!events.iter().any(|e| matches!(e, CommandEvent::Error(_))));

    Ok(())
}

#[tokio::test]
async fn missing_frame_reports_process_failed_with_stderr() -> TestResult {
    init_tracing();

    let stub = StubEncoder::install()?;
    let mut frames = stub.write_frames(2)?;
    let missing = stub.path("frames/does-not-exist.png");
    frames.push(missing.clone());

    let options = EncodeOptionsBuilder::new(stub.path("video.gif"))
        .frames(frames)
        .build();
    let result = with_timeout(GifskiCommand::new(stub.program(), options).run()).await?;

    let stderr = result.stderr.clone().expect("stderr captured");
    assert!(stderr.contains("unable to load"));
    assert!(stderr.contains(&*missing.to_string_lossy()));

    match &result.error {
        Some(err @ ExecError::ProcessFailed { code, .. }) => {
            assert_eq!(*code, 1);
            let msg = err.to_string();
            assert!(msg.starts_with("gifski exited with code 1: "), "{msg}");
            assert!(msg.contains(&stderr));
        }
        other => panic!("expected ProcessFailed, got {other:?}"),
    }
    assert!(!stub.path("video.gif").exists());

    Ok(())
}

#[tokio::test]
async fn higher_quality_gives_larger_output() -> TestResult {
    init_tracing();

    let stub = StubEncoder::install()?;
    let frames = stub.write_frames(3)?;
    let high = stub.path("video.gif");
    let low = stub.path("video2.gif");

    let result = GifskiCommand::new(
        stub.program(),
        EncodeOptionsBuilder::new(&high)
            .frames(frames.clone())
            .quality(100)
            .build(),
    )
    .run()
    .await?;
    assert!(result.is_success());

    let result = GifskiCommand::new(
        stub.program(),
        EncodeOptionsBuilder::new(&low)
            .frames(frames)
            .quality(10)
            .build(),
    )
    .run()
    .await?;
    assert!(result.is_success());

    assert!(std::fs::metadata(&high)?.len() > std::fs::metadata(&low)?.len());

    Ok(())
}

#[tokio::test]
async fn stdout_sentinel_captures_binary_payload() -> TestResult {
    init_tracing();

    let stub = StubEncoder::install()?;
    let frames = stub.write_frames(2)?;
    let options = EncodeOptionsBuilder::to_stdout()
        .frames(frames)
        .quality(40)
        .log_lines(1)
        .build();

    let command = GifskiCommand::new(stub.program(), options)
        .with_spawn_options(SpawnOptions::default().current_dir(stub.dir()));
    let (events, result) = with_timeout(collect_events(&command)).await;

    assert!(result.is_success());
    assert_eq!(result.stdout, CapturedOutput::Binary(expected_payload(40)));
    assert_eq!(result.stdout.as_bytes(), Some(&expected_payload(40)[..]));
    assert!(!stub.dir().join("-").exists());
    assert!(!events.iter().any(|e| matches!(e, CommandEvent::Progress(_))));

    Ok(())
}

#[tokio::test]
async fn quiet_mode_leaves_stdout_absent() -> TestResult {
    init_tracing();

    let stub = StubEncoder::install()?;
    let frames = stub.write_frames(2)?;
    let output = stub.path("video.gif");
    let options = EncodeOptionsBuilder::new(&output)
        .frames(frames)
        .quiet(true)
        .build();

    let result = GifskiCommand::new(stub.program(), options).run().await?;

    assert!(result.is_success());
    assert!(result.stdout.is_absent());
    assert!(output.is_file());

    Ok(())
}

#[tokio::test]
async fn retention_limit_keeps_latest_stdout_lines() -> TestResult {
    init_tracing();

    let stub = StubEncoder::install()?;
    let frames = stub.write_frames(10)?;
    let options = EncodeOptionsBuilder::new(stub.path("video.gif"))
        .frames(frames)
        .log_lines(3)
        .build();

    let result = GifskiCommand::new(stub.program(), options).run().await?;

    let stdout = result.stdout.as_text().expect("text stdout");
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Frame 8 / 10"));
    assert!(lines[2].starts_with("Frame 10 / 10"));

    Ok(())
}

#[tokio::test]
async fn launch_failure_emits_error_before_end() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let options = EncodeOptionsBuilder::new(dir.path().join("video.gif"))
        .frame(dir.path().join("a.png"))
        .build();
    let command = GifskiCommand::new(dir.path().join("missing-gifski"), options)
        .with_program_name("gifski");
    assert_eq!(command.program(), dir.path().join("missing-gifski"));
    assert_eq!(command.program_name(), "gifski");

    let (events, result) = with_timeout(collect_events(&command)).await;

    assert_eq!(events.len(), 2, "events: {events:?}");
    match (&events[0], &events[1]) {
        (CommandEvent::Error(err), CommandEvent::End(end)) => {
            assert!(matches!(err, ExecError::LaunchFailed { .. }));
            assert_eq!(end.error.as_ref(), Some(err));
        }
        other => panic!("unexpected event order: {other:?}"),
    }
    assert!(result.error.unwrap().to_string().starts_with("failed to launch gifski"));
    assert!(result.stdout.is_absent());
    assert!(result.stderr.is_none());

    Ok(())
}

#[tokio::test]
async fn forced_exit_code_is_reported_with_stderr() -> TestResult {
    init_tracing();

    let stub = StubEncoder::install()?;
    let frames = stub.write_frames(1)?;
    let options = EncodeOptionsBuilder::new(stub.path("video.gif"))
        .frames(frames)
        .build();
    let command = GifskiCommand::new(stub.program(), options)
        .with_spawn_options(SpawnOptions::default().env("STUB_EXIT", "3"));

    let result = command.run().await?;

    assert_eq!(
        result.error.map(|e| e.to_string()).as_deref(),
        Some("gifski exited with code 3: error: forced failure")
    );

    Ok(())
}

#[tokio::test]
async fn signal_termination_is_process_killed() -> TestResult {
    init_tracing();

    let stub = StubEncoder::install()?;
    let frames = stub.write_frames(1)?;

    for (name, expected) in [("USR1", "SIGUSR1"), ("TERM", "SIGTERM")] {
        let options = EncodeOptionsBuilder::new(stub.path("video.gif"))
            .frames(frames.clone())
            .build();
        let command = GifskiCommand::new(stub.program(), options)
            .with_spawn_options(SpawnOptions::default().env("STUB_SELF_SIGNAL", name));

        let result = with_timeout(command.run()).await?;
        assert_eq!(
            result.error,
            Some(ExecError::ProcessKilled {
                program: "gifski".to_string(),
                signal: expected.to_string(),
            })
        );
    }

    Ok(())
}

#[tokio::test]
async fn terminate_stops_a_running_process() -> TestResult {
    init_tracing();

    let stub = StubEncoder::install()?;
    let frames = stub.write_frames(1)?;

    for (signal, expected) in [(KillSignal::Kill, "SIGKILL"), (KillSignal::Term, "SIGTERM")] {
        let options = EncodeOptionsBuilder::new(stub.path("video.gif"))
            .frames(frames.clone())
            .build();
        let command = GifskiCommand::new(stub.program(), options)
            .with_spawn_options(SpawnOptions::default().env("STUB_SLEEP", "30"));

        let mut execution = command.start();
        assert!(execution.pid().is_some());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(execution.terminate(signal));
        assert!(!execution.terminate(signal), "second terminate is a no-op");

        let result = with_timeout(execution.wait()).await?;
        match result.error {
            Some(ExecError::ProcessKilled { signal, .. }) => assert_eq!(signal, expected),
            other => panic!("expected ProcessKilled, got {other:?}"),
        }
    }

    Ok(())
}

#[tokio::test]
async fn concurrent_executions_are_independent() -> TestResult {
    init_tracing();

    let stub = StubEncoder::install()?;
    let frames = stub.write_frames(3)?;

    let ok = GifskiCommand::new(
        stub.program(),
        EncodeOptionsBuilder::new(stub.path("a.gif"))
            .frames(frames.clone())
            .build(),
    );
    let binary = GifskiCommand::new(
        stub.program(),
        EncodeOptionsBuilder::to_stdout()
            .frames(frames.clone())
            .quality(5)
            .build(),
    );
    let failing = GifskiCommand::new(
        stub.program(),
        EncodeOptionsBuilder::new(stub.path("b.gif"))
            .frame(stub.path("missing.png"))
            .build(),
    );

    let (ok, binary, failing) =
        with_timeout(async { tokio::join!(ok.run(), binary.run(), failing.run()) }).await;
    let (ok, binary, failing) = (ok?, binary?, failing?);

    assert!(ok.is_success());
    assert_eq!(ok.stdout.as_text().map(|s| s.lines().count()), Some(3));
    assert_eq!(binary.stdout, CapturedOutput::Binary(expected_payload(5)));
    assert!(matches!(
        failing.error,
        Some(ExecError::ProcessFailed { code: 1, .. })
    ));

    Ok(())
}

#[tokio::test]
async fn wait_with_progress_reports_each_frame() -> TestResult {
    init_tracing();

    let stub = StubEncoder::install()?;
    let frames = stub.write_frames(5)?;
    let options = EncodeOptionsBuilder::new(stub.path("video.gif"))
        .frames(frames)
        .build();

    let mut seen = Vec::new();
    let result = with_timeout(
        GifskiCommand::new(stub.program(), options)
            .start()
            .wait_with_progress(|p| seen.push(p.current_frame)),
    )
    .await?;

    assert!(result.is_success());
    assert_eq!(seen, vec![1, 2, 3, 4, 5]);

    Ok(())
}

#[tokio::test]
async fn carriage_return_progress_arrives_while_encoding() -> TestResult {
    init_tracing();

    let stub = StubEncoder::install()?;
    let frames = stub.write_frames(3)?;
    let options = EncodeOptionsBuilder::new(stub.path("video.gif"))
        .frames(frames)
        .build();
    let command = GifskiCommand::new(stub.program(), options)
        .with_spawn_options(SpawnOptions::default().env("STUB_CR_PROGRESS", "1"));

    let started = Instant::now();
    let mut execution = command.start();
    let mut progress_at = Vec::new();
    let mut end_at = None;
    while let Some(event) = with_timeout(execution.next_event()).await {
        match event {
            CommandEvent::Progress(p) => progress_at.push((p.current_frame, started.elapsed())),
            CommandEvent::End(_) => {
                end_at = Some(started.elapsed());
                break;
            }
            CommandEvent::Error(err) => panic!("unexpected error event: {err}"),
        }
    }
    let end_at = end_at.expect("End event delivered");
    let result = execution.wait().await?;

    assert!(result.is_success());
    assert_eq!(
        progress_at.iter().map(|(frame, _)| *frame).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    // The stub sleeps one second after each frame, so a marker delivered
    // live arrives well before the process exits.
    let (_, first_at) = progress_at[0];
    assert!(
        end_at - first_at >= Duration::from_millis(1500),
        "frame 1 at {first_at:?}, end at {end_at:?}"
    );
    assert!(progress_at[1].1 - first_at >= Duration::from_millis(500));

    Ok(())
}
