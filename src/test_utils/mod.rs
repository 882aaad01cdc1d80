//! Test utilities for lambda-local
//!
//! Shared by the in-crate unit tests and the `tests/` suites (through the
//! `test-utils` feature): one-time logging setup and a set of sample
//! templates.
//!
//! # Example
//!
//! ```rust,no_run
//! use lambda_local::template::Template;
//! use lambda_local::test_utils::{TemplateFixture, init_test_logging};
//!
//! init_test_logging(None);
//! let template = Template::parse(&TemplateFixture::hello_world().content).unwrap();
//! assert_eq!(template.functions().len(), 1);
//! ```

pub mod fixtures;

pub use fixtures::TemplateFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. With `level` set, that level is used;
/// otherwise `RUST_LOG` is honored, and without either nothing is logged.
///
/// ```bash
/// RUST_LOG=lambda_local=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
