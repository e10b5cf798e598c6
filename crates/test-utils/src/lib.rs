//! Shared helpers for the `gifski-command` integration tests.

pub mod builders;
pub mod stub_encoder;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use gifski_command::logging::LOG_ENV;
use tracing_subscriber::EnvFilter;

/// Upper bound for one awaited step in a test (a whole stub run included).
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

static TRACING: Once = Once::new();

/// Install a per-test-binary subscriber writing through the test harness,
/// so output only shows up for failing tests (or with `--nocapture`).
///
/// The filter comes from `GIFSKI_COMMAND_LOG`, then `RUST_LOG`, and
/// defaults to `gifski_command=debug` so a failure shows the signal flow.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = std::env::var(LOG_ENV)
            .ok()
            .and_then(|s| EnvFilter::try_new(s).ok())
            .or_else(|| EnvFilter::try_from_default_env().ok())
            .unwrap_or_else(|| EnvFilter::new("gifski_command=debug"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Await `f`, panicking once [`TEST_TIMEOUT`] has passed.
pub async fn with_timeout<F: Future>(f: F) -> F::Output {
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(out) => out,
        Err(_) => panic!("test timed out after {TEST_TIMEOUT:?}"),
    }
}
