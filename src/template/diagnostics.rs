//! Per-resource diagnostics and the extraction result.

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::function::{BuildError, Function};
use crate::intrinsics::ContextOverrides;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// An optional property was dropped; the function is still present
    Warning,
    /// The resource could not be built; the function is absent
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A problem found while extracting one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Resource the problem belongs to
    pub logical_id: String,
    /// Warning or error
    pub severity: Severity,
    /// Property path for warnings about a single property
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// What went wrong
    #[serde(rename = "message", serialize_with = "serialize_display")]
    pub error: BuildError,
}

fn serialize_display<S: Serializer>(error: &BuildError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

impl Diagnostic {
    /// An error that dropped the whole resource.
    #[must_use]
    pub fn error(logical_id: impl Into<String>, error: BuildError) -> Self {
        Self {
            logical_id: logical_id.into(),
            severity: Severity::Error,
            property: None,
            error,
        }
    }

    /// A warning about a single dropped property.
    #[must_use]
    pub fn warning(logical_id: impl Into<String>, property: impl Into<String>, error: BuildError) -> Self {
        Self {
            logical_id: logical_id.into(),
            severity: Severity::Warning,
            property: Some(property.into()),
            error,
        }
    }
}

impl Diagnostic {
    /// A warning about a resource entry the decoder could not read.
    #[must_use]
    pub fn malformed(logical_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            severity: Severity::Warning,
            property: None,
            error: BuildError::MalformedResource {
                reason: reason.into(),
            },
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.property {
            Some(property) => write!(f, "{} ({}): {}", self.logical_id, property, self.error),
            None => write!(f, "{}: {}", self.logical_id, self.error),
        }
    }
}

/// Knobs for [`Template::extract`](super::Template::extract).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionOptions {
    /// Parameter and pseudo-parameter values
    pub overrides: ContextOverrides,
    /// Omit resources whose `Condition` evaluates to false
    pub skip_false_conditions: bool,
}

impl ExtractionOptions {
    /// Options with the given overrides and conditions honored optimistically.
    #[must_use]
    pub fn with_overrides(overrides: ContextOverrides) -> Self {
        Self {
            overrides,
            skip_false_conditions: false,
        }
    }
}

/// Functions extracted from a template, in declaration order, plus diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extraction {
    /// Successfully built functions
    pub functions: Vec<Function>,
    /// Problems encountered along the way
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    /// Look up a function by logical ID.
    #[must_use]
    pub fn function(&self, logical_id: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.logical_id == logical_id)
    }

    /// Diagnostics of severity [`Severity::Error`].
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    /// Diagnostics of severity [`Severity::Warning`].
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning)
    }

    /// Whether any resource failed to build.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Functions keyed by logical ID.
    #[must_use]
    pub fn into_map(self) -> HashMap<String, Function> {
        self.functions.into_iter().map(|f| (f.logical_id.clone(), f)).collect()
    }
}
