//! Structured logging initialization for tests.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Initialize test logging once per process.
///
/// The filter is taken from `TEST_LOG`, then `RUST_LOG`, then falls back to
/// `"warn"`. Idempotent and race-safe: repeated calls, or another subscriber
/// already being installed, are not errors.
pub fn init() {
    let filter = std::env::var("TEST_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    init_with_filter(&filter);
}

/// Initialize test logging with an explicit filter directive.
pub fn init_with_filter(filter: &str) {
    let filter = EnvFilter::new(filter);
    INITIALIZED.get_or_init(|| {
        fmt()
            .with_env_filter(filter)
            .with_test_writer() // keeps output attached to the owning test
            .without_time() // stable output
            .try_init()
            .ok();
    });
}
