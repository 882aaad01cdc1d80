//! Errors raised while assembling a [`Function`](super::Function).

use thiserror::Error;

use crate::intrinsics::ResolutionError;

/// Why a function resource could not be built, or why one of its optional
/// properties was dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A property every function needs is absent or resolved to no value.
    #[error("Missing required field '{field}'")]
    MissingRequiredField {
        /// Property name (`Handler`, `Runtime`, `CodeUri`, ...)
        field: String,
    },

    /// The code location has a shape that cannot be interpreted.
    #[error("Invalid code location: {reason}")]
    InvalidCodeLocation {
        /// What was wrong with it
        reason: String,
    },

    /// A property resolved to a value of the wrong type.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidField {
        /// Property name
        field: String,
        /// What was expected
        reason: String,
    },

    /// An `Events` entry lacks something its type requires.
    #[error("Invalid event '{event}': {reason}")]
    InvalidEvent {
        /// Event name (key under `Events`)
        event: String,
        /// What was missing or malformed
        reason: String,
    },

    /// An intrinsic inside a property could not be evaluated.
    #[error("Failed to resolve '{field}': {source}")]
    Resolution {
        /// Property path, e.g. `Handler` or `Environment.Variables.TABLE`
        field: String,
        /// The underlying resolution failure
        #[source]
        source: ResolutionError,
    },

    /// A `Resources` entry is missing `Type` or has the wrong shape and was skipped.
    #[error("Malformed resource skipped: {reason}")]
    MalformedResource {
        /// Decoder message
        reason: String,
    },
}

impl BuildError {
    pub(crate) fn missing(field: &str) -> Self {
        Self::MissingRequiredField {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_code(reason: impl Into<String>) -> Self {
        Self::InvalidCodeLocation {
            reason: reason.into(),
        }
    }

    pub(crate) fn resolution(field: impl Into<String>, source: ResolutionError) -> Self {
        Self::Resolution {
            field: field.into(),
            source,
        }
    }
}
