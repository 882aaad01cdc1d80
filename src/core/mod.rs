//! Core error handling shared by the configuration layer and the CLI.
//!
//! - [`LambdaLocalError`] enumerates application-level failures
//! - [`ErrorContext`] pairs an error with details and a suggestion
//! - [`user_friendly_error`] turns any `anyhow::Error` into an [`ErrorContext`]

pub mod error;

pub use error::{ErrorContext, LambdaLocalError, user_friendly_error};
