//! Test utilities shared by unit and integration tests.
//!
//! Enabled for the crate's own tests and, through the `test-utils` feature,
//! for the integration test suite.

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::Solution;
use crate::core::Result;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// This function initializes the tracing subscriber for tests, but only once
/// regardless of how many times it's called. It respects the `RUST_LOG` environment
/// variable if set, or uses the provided log level.
///
/// # Example
///
/// ```rust,no_run
/// use tracing::Level;
///
/// fn my_test() {
///     // Use environment variable
///     solutions::test_utils::init_test_logging(None);
///
///     // Or set level programmatically
///     solutions::test_utils::init_test_logging(Some(Level::DEBUG));
/// }
/// ```
///
/// To enable logging in tests via environment variable:
/// ```bash
/// RUST_LOG=solutions=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            // No logging if neither is provided
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer() // Important: uses test-compatible writer
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Build a solution from content with fixed test context.
pub fn solution_fixture(content: &str) -> Result<Solution> {
    Solution::new(content, "test-user", "test-label", "test-branch")
}
