// Logging setup on top of `tracing-subscriber`.
//
// RUST_LOG takes precedence over the `--log-level` flag, e.g.
// `RUST_LOG=cbam_forge_report=debug` to see every discarded row.
use tracing_subscriber::{fmt, EnvFilter};

pub fn init(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Verbose logging routed through the test harness; safe to call repeatedly.
#[cfg(test)]
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
