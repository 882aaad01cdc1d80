//! Integration test suite for lambda-local
//!
//! These tests drive the compiled binary against templates and configuration
//! files written to a temporary directory, with `HOME` pointed at an isolated
//! location.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **catalog**: Text and JSON output for SAM and plain CloudFormation templates
//! - **config**: Profiles, pseudo-parameters and parameter overrides
//! - **error_scenarios**: Unreadable or malformed input and exit codes

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod catalog;
mod config;
mod error_scenarios;
