//! Fatal template errors.
//!
//! Anything in this module aborts loading the whole template. Problems with a
//! single resource are reported as [`Diagnostic`](super::Diagnostic)s instead.

use thiserror::Error;

/// A template that cannot be used at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The document is not valid YAML/JSON or does not have the expected shape.
    #[error("Failed to decode template: {reason}")]
    Decode {
        /// Decoder message, including line and column when available
        reason: String,
    },

    /// A top-level section has the wrong shape (e.g. `Resources` is a list).
    #[error("Invalid {section} section: {reason}")]
    InvalidSection {
        /// Section name (`Resources`, `Parameters`, ...)
        section: String,
        /// What was wrong with it
        reason: String,
    },

    /// Strict decoding found a key it does not recognize.
    #[error("Unknown field '{field}' in {location}")]
    UnknownField {
        /// The unrecognized key
        field: String,
        /// Where it was found (`template` or `Resources.<LogicalId>`)
        location: String,
    },

    /// The template has no `Resources` section.
    #[error("Template has no Resources section")]
    MissingResources,

    /// The `Resources` section exists but declares nothing.
    #[error("Template Resources section is empty")]
    EmptyResources,

    /// The template file could not be read.
    #[error("Failed to read template {path}: {reason}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying I/O error message
        reason: String,
    },
}

impl From<serde_yaml::Error> for TemplateError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Decode {
            reason: error.to_string(),
        }
    }
}
