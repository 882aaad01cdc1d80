//! Application-level errors and their user-facing presentation.
//!
//! Library code returns typed errors ([`TemplateError`], [`ResolutionError`],
//! [`BuildError`]). Everything above the library (configuration, the CLI)
//! works with [`anyhow::Result`] and adds context as it goes. At the very
//! top, [`user_friendly_error`] looks through the `anyhow` chain for an error
//! it recognizes and wraps it in an [`ErrorContext`] carrying details and an
//! actionable suggestion.
//!
//! # Examples
//!
//! ```rust,no_run
//! use lambda_local::core::{LambdaLocalError, user_friendly_error};
//!
//! let error = anyhow::Error::from(LambdaLocalError::InvalidOverride {
//!     value: "Env".to_string(),
//! });
//! let context = user_friendly_error(error);
//! context.display(); // colored error, details and suggestion on stderr
//! ```
//!
//! [`ResolutionError`]: crate::intrinsics::ResolutionError
//! [`BuildError`]: crate::function::BuildError

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::template::TemplateError;

/// Errors surfaced by the `lambda-local` binary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LambdaLocalError {
    /// The template could not be loaded.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The configuration file exists but cannot be used.
    #[error("Invalid configuration file {path}: {reason}")]
    ConfigParseError {
        /// Path to the configuration file
        path: String,
        /// Parser message
        reason: String,
    },

    /// The selected profile is not declared in the configuration file.
    #[error("Profile '{name}' not found in configuration")]
    ProfileNotFound {
        /// Requested profile name
        name: String,
        /// Profiles that are declared
        available: Vec<String>,
    },

    /// A `--parameter-overrides` entry is not `KEY=VALUE`.
    #[error("Invalid parameter override '{value}': expected KEY=VALUE")]
    InvalidOverride {
        /// The rejected argument
        value: String,
    },

    /// One or more function resources could not be built.
    #[error("{count} function resource(s) could not be built")]
    ExtractionFailed {
        /// Number of error diagnostics
        count: usize,
    },

    /// A filesystem operation failed.
    #[error("File system error during {operation}: {path}")]
    FileSystemError {
        /// What was being done
        operation: String,
        /// Path involved
        path: String,
    },

    /// Anything else.
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// An error plus optional details and a suggestion, for CLI display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: LambdaLocalError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error with no suggestion or details.
    #[must_use]
    pub const fn new(error: LambdaLocalError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: error in red, details in yellow,
    /// suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with actionable suggestions.
///
/// Recognizes [`LambdaLocalError`], [`TemplateError`], [`std::io::Error`] and
/// [`toml::de::Error`] anywhere in the chain. Anything else is reported with
/// its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(known) = cause.downcast_ref::<LambdaLocalError>() {
            return create_error_context(known.clone());
        }
        if let Some(template) = cause.downcast_ref::<TemplateError>() {
            return create_error_context(LambdaLocalError::Template(template.clone()));
        }
        if let Some(toml_error) = cause.downcast_ref::<toml::de::Error>() {
            return ErrorContext::new(LambdaLocalError::ConfigParseError {
                path: "config.toml".to_string(),
                reason: toml_error.to_string(),
            })
            .with_suggestion("Check the TOML syntax of your lambda-local configuration file")
            .with_details("Profiles live under [profiles.<name>] and accept region, account_id, stack_name and a parameters table");
        }
        if let Some(io_error) = cause.downcast_ref::<std::io::Error>() {
            if io_error.kind() == std::io::ErrorKind::PermissionDenied {
                return ErrorContext::new(LambdaLocalError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check the file permissions and ownership");
            }
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    ErrorContext::new(LambdaLocalError::Other {
        message,
    })
}

fn create_error_context(error: LambdaLocalError) -> ErrorContext {
    match &error {
        LambdaLocalError::Template(template) => {
            let (suggestion, details) = match template {
                TemplateError::Io {
                    ..
                } => (
                    "Check that the path passed to --template exists and is readable",
                    "The template is read once at startup",
                ),
                TemplateError::Decode {
                    ..
                } => (
                    "Check the YAML/JSON syntax: indentation, quoting, and duplicate keys",
                    "Duplicate keys in a mapping (including duplicate logical IDs) are rejected",
                ),
                TemplateError::UnknownField {
                    ..
                } => (
                    "Fix the misspelled key or run without --strict to ignore unknown keys",
                    "Strict decoding only accepts documented top-level and resource-level keys",
                ),
                TemplateError::MissingResources | TemplateError::EmptyResources => (
                    "Add at least one resource under the top-level Resources key",
                    "Every SAM/CloudFormation template must declare resources",
                ),
                TemplateError::InvalidSection {
                    ..
                } => (
                    "Check the shape of the named section against the CloudFormation template reference",
                    "Top-level sections and resource Properties must be mappings",
                ),
            };
            ErrorContext::new(error.clone()).with_suggestion(suggestion).with_details(details)
        }

        LambdaLocalError::ConfigParseError {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Fix the configuration file or point --config at another one"),

        LambdaLocalError::ProfileNotFound {
            available,
            ..
        } => {
            let context = ErrorContext::new(error.clone());
            if available.is_empty() {
                context.with_suggestion("Declare the profile under [profiles.<name>] in ~/.lambda-local/config.toml, or drop --profile and unset LAMBDA_LOCAL_PROFILE")
            } else {
                context.with_suggestion(format!("Available profiles: {}", available.join(", ")))
            }
        }

        LambdaLocalError::InvalidOverride {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Pass overrides as --parameter-overrides Name=Value, once per parameter"),

        LambdaLocalError::ExtractionFailed {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Fix the resources listed above, or drop --fail-on-error to continue with the rest")
            .with_details("Each failing resource was reported as an error diagnostic"),

        LambdaLocalError::FileSystemError {
            ..
        }
        | LambdaLocalError::Other {
            ..
        } => ErrorContext::new(error.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_context_display_includes_suggestion() {
        let context = ErrorContext::new(LambdaLocalError::InvalidOverride {
            value: "Env".to_string(),
        })
        .with_suggestion("use Name=Value")
        .with_details("overrides are parameters");
        let text = context.to_string();
        assert!(text.contains("Invalid parameter override 'Env'"));
        assert!(text.contains("Details: overrides are parameters"));
        assert!(text.contains("Suggestion: use Name=Value"));
    }

    #[test]
    fn test_template_error_found_through_context() {
        let error = Err::<(), _>(TemplateError::MissingResources)
            .context("Failed to load template.yaml")
            .unwrap_err();
        let context = user_friendly_error(error);
        assert_eq!(context.error, LambdaLocalError::Template(TemplateError::MissingResources));
        assert!(context.suggestion.unwrap().contains("Resources"));
    }

    #[test]
    fn test_profile_not_found_lists_available() {
        let context = user_friendly_error(anyhow::Error::from(LambdaLocalError::ProfileNotFound {
            name: "prod".to_string(),
            available: vec!["dev".to_string(), "staging".to_string()],
        }));
        assert_eq!(context.suggestion.as_deref(), Some("Available profiles: dev, staging"));
    }

    #[test]
    fn test_unknown_error_keeps_chain() {
        let error = anyhow::anyhow!("root cause").context("outer");
        let context = user_friendly_error(error);
        let LambdaLocalError::Other {
            message,
        } = context.error
        else {
            panic!("expected generic error");
        };
        assert!(message.starts_with("outer"));
        assert!(message.contains("1: root cause"));
    }
}
