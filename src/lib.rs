//! lambda-local - SAM/CloudFormation function extraction
//!
//! Loads an AWS SAM or plain CloudFormation template and turns every
//! function resource it declares into a normalized [`Function`](function::Function)
//! record: handler, runtime, code location, memory, timeout, environment and
//! event triggers, with intrinsic functions resolved and `Globals` applied.
//! The catalog is what a local invocation server needs to route requests to
//! handlers.
//!
//! # Architecture Overview
//!
//! ```text
//! template text ──decode──▶ Template ──classify──▶ candidates ──build──▶ Function
//!                                │                                  └──▶ Diagnostic
//!                                └──▶ ResolutionContext ──▶ Resolver
//! ```
//!
//! Loading fails only for a malformed document. Individual resources that
//! cannot be built are reported as diagnostics and left out of the catalog.
//!
//! # Core Modules
//!
//! - [`template`] - Decoding, the `Globals` merge, resource classification and
//!   the [`Template`](template::Template) model
//! - [`intrinsics`] - Evaluation of `Ref`, `Fn::Sub`, `Fn::If` and the other
//!   intrinsic functions against parameters, mappings and conditions
//! - [`function`] - The function record and the builder that produces it
//!
//! ## Supporting Modules
//!
//! - [`cli`] - Command-line interface
//! - [`config`] - User configuration (`~/.lambda-local/config.toml`)
//! - [`core`] - Top-level errors and user-facing error formatting
//! - [`constants`] - Built-in defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use lambda_local::intrinsics::ContextOverrides;
//! use lambda_local::template::{DecoderOptions, ExtractionOptions, Template};
//! use std::path::Path;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let template = Template::load(Path::new("template.yaml"), &DecoderOptions::lenient()).await?;
//! let extraction = template.extract(&ExtractionOptions::with_overrides(
//!     ContextOverrides::new().with_parameter("Env", "prod").with_region("eu-west-1"),
//! ));
//! for function in &extraction.functions {
//!     println!("{} -> {}", function.logical_id, function.handler);
//! }
//! for diagnostic in &extraction.diagnostics {
//!     eprintln!("{diagnostic}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod function;
pub mod intrinsics;
pub mod template;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
