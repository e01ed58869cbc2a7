//! Logging setup on top of `tracing-subscriber`.

use tracing_subscriber::{EnvFilter, fmt};

/// Initialises the global subscriber.
///
/// `RUST_LOG` selects the filter (default: `info`), e.g.
/// `RUST_LOG=load_planner=debug` to see per-plan details.
///
/// ```no_run
/// load_planner::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Verbose subscriber for tests; safe to call more than once.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
