//! Errors raised while evaluating intrinsic functions.
//!
//! A [`ResolutionError`] is scoped to the single property being resolved. The
//! function builder decides whether that makes the whole resource unusable
//! (required fields) or only drops the property (optional fields).

use thiserror::Error;

/// Failure to evaluate an intrinsic expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// `Ref`, `Fn::Sub` placeholder, or condition name that names nothing
    /// known to the resolution context.
    #[error("Unresolved reference '{name}'{}", format_hint(.hint))]
    UnresolvedReference {
        /// The name that could not be resolved
        name: String,
        /// Optional hint (closest known name, missing default, ...)
        hint: Option<String>,
    },

    /// `Fn::FindInMap` could not find one of its keys.
    #[error("Mapping lookup failed: key '{key}' not found in '{path}'")]
    MappingLookup {
        /// Path walked so far (`MapName` or `MapName.TopKey`)
        path: String,
        /// The key that was absent
        key: String,
    },

    /// A `Fn::*` key the resolver does not implement.
    #[error("Unsupported intrinsic function '{name}'")]
    UnsupportedIntrinsic {
        /// The intrinsic key as written in the template
        name: String,
    },

    /// Resolution reached a parameter, mapping entry, or condition that is
    /// already being resolved.
    #[error("Circular reference detected: {chain}")]
    Cycle {
        /// The reference chain, closing back on itself
        chain: String,
    },

    /// Intrinsic arguments have the wrong shape or resolve to the wrong type.
    #[error("Invalid arguments to {intrinsic}: {reason}")]
    InvalidArguments {
        /// Intrinsic whose arguments were rejected
        intrinsic: String,
        /// What was wrong with them
        reason: String,
    },

    /// A supplied parameter value violates the parameter's declaration.
    #[error("Invalid value '{value}' for parameter '{name}': {reason}")]
    InvalidParameterValue {
        /// Parameter name
        name: String,
        /// The rejected value
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

fn format_hint(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!(" ({hint})"),
        None => String::new(),
    }
}

impl ResolutionError {
    pub(crate) fn invalid_arguments(intrinsic: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            intrinsic: intrinsic.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolved(name: impl Into<String>, hint: Option<String>) -> Self {
        Self::UnresolvedReference {
            name: name.into(),
            hint,
        }
    }
}
