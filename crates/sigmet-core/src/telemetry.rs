//! Log output for the `sigmet` binary.
//!
//! Human-readable or JSON lines on stderr, filtered by `RUST_LOG` with a
//! caller-chosen fallback level.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter from `RUST_LOG`, or `level` when it is unset or unparseable.
fn filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Install the process-wide subscriber. Only the first call has an effect.
///
/// stdout is left to command output.
pub fn init_tracing(json: bool, level: Level) {
    let text = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });
    let lines = json.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
    });

    tracing_subscriber::registry()
        .with(filter(level))
        .with(text)
        .with(lines)
        .try_init()
        .ok();
}
