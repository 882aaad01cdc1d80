//! Configuration loading.
//!
//! See [`GlobalConfig`] for the file format and precedence rules.

mod global;

pub use global::{GlobalConfig, ProfileSettings};
