//! The template model: a decoded SAM/CloudFormation document and the function
//! catalog derived from it.
//!
//! A [`Template`] is immutable once decoded. Every call to
//! [`Template::extract`] (and the [`functions`](Template::functions) /
//! [`ordered_functions`](Template::ordered_functions) shorthands) builds a
//! fresh [`ResolutionContext`], classifies the resources, and assembles one
//! [`Function`] per function resource:
//!
//! ```text
//! Resources ──classify──▶ Candidate (Globals merged) ──build──▶ Function
//!                                                       └──────▶ Diagnostic
//! ```
//!
//! Only [`TemplateError`]s abort loading. A resource that cannot be built is
//! left out of the catalog and reported as a [`Diagnostic`].
//!
//! # Example
//!
//! ```rust,no_run
//! use lambda_local::template::Template;
//!
//! let template = Template::parse(r#"
//! Resources:
//!   Hello:
//!     Type: AWS::Serverless::Function
//!     Properties:
//!       Handler: index.handler
//!       Runtime: nodejs18.x
//!       CodeUri: hello/
//! "#)?;
//! let functions = template.functions();
//! assert_eq!(functions["Hello"].timeout, 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod classifier;
mod decoder;
mod diagnostics;
pub mod error;
mod globals;
mod parameter;


pub use classifier::{Candidate, classify};
pub use decoder::DecoderOptions;
pub use diagnostics::{Diagnostic, Extraction, ExtractionOptions, Severity};
pub use error::TemplateError;
pub use globals::{Globals, merge_properties, sam_section};
pub use parameter::{Parameter, ParameterType};

use serde_yaml::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::SAM_TRANSFORM;
use crate::function::{BuildError, Function, build};
use crate::intrinsics::{ContextOverrides, ResolutionContext, Resolver};

/// One entry of the `Resources` section.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Key under `Resources`
    pub logical_id: String,
    /// `Type`, e.g. `AWS::Serverless::Function`
    pub resource_type: String,
    /// Raw `Properties` (always a mapping, possibly empty)
    pub properties: Value,
    /// `Condition` guarding the resource
    pub condition: Option<String>,
    /// `DependsOn`, normalized to a list
    pub depends_on: Vec<String>,
}

/// A decoded template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    description: Option<String>,
    transforms: Vec<String>,
    parameters: BTreeMap<String, Parameter>,
    mappings: BTreeMap<String, Value>,
    conditions: BTreeMap<String, Value>,
    globals: Globals,
    resources: Vec<Resource>,
    skipped: Vec<Diagnostic>,
    base_dir: Option<PathBuf>,
}

impl Template {
    /// Decode template text with default (non-strict) options.
    ///
    /// # Errors
    ///
    /// See [`Template::parse_with`].
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        Self::parse_with(text, &DecoderOptions::default())
    }

    /// Decode template text.
    ///
    /// # Errors
    ///
    /// Fails with a [`TemplateError`] when the text is not YAML/JSON, a
    /// section has the wrong shape, `Resources` is missing or empty, or (in
    /// strict mode) an unknown key is present.
    pub fn parse_with(text: &str, options: &DecoderOptions) -> Result<Self, TemplateError> {
        decoder::decode(text, options)
    }

    /// Read and decode a template file.
    ///
    /// The file's directory is remembered so relative `CodeUri` paths can be
    /// resolved later.
    ///
    /// # Errors
    ///
    /// Fails with [`TemplateError::Io`] if the file cannot be read, or any
    /// error from [`Template::parse_with`].
    pub async fn load(path: &Path, options: &DecoderOptions) -> Result<Self, TemplateError> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| TemplateError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut template = Self::parse_with(&text, options)?;
        template.base_dir = path.parent().map(Path::to_path_buf);
        debug!("Loaded template from {}", path.display());
        Ok(template)
    }

    /// `Description`, if present.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declared `Transform`s.
    #[must_use]
    pub fn transforms(&self) -> &[String] {
        &self.transforms
    }

    /// Whether the template declares the SAM transform.
    #[must_use]
    pub fn is_serverless(&self) -> bool {
        self.transforms.iter().any(|t| t == SAM_TRANSFORM)
    }

    /// `Parameters`, by name.
    #[must_use]
    pub const fn parameters(&self) -> &BTreeMap<String, Parameter> {
        &self.parameters
    }

    /// `Mappings`, by name.
    #[must_use]
    pub const fn mappings(&self) -> &BTreeMap<String, Value> {
        &self.mappings
    }

    /// `Conditions`, by name.
    #[must_use]
    pub const fn conditions(&self) -> &BTreeMap<String, Value> {
        &self.conditions
    }

    /// `Globals`.
    #[must_use]
    pub const fn globals(&self) -> &Globals {
        &self.globals
    }

    /// All resources in declaration order.
    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// A resource by logical ID.
    #[must_use]
    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.logical_id == logical_id)
    }

    /// Resource entries dropped while decoding because they were malformed.
    #[must_use]
    pub fn skipped_resources(&self) -> &[Diagnostic] {
        &self.skipped
    }

    /// Directory the template was loaded from.
    #[must_use]
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Build the context intrinsics are evaluated against.
    #[must_use]
    pub fn resolution_context<'a>(&'a self, overrides: &'a ContextOverrides) -> ResolutionContext<'a> {
        ResolutionContext::new(
            &self.parameters,
            &self.mappings,
            &self.conditions,
            self.resources.iter().map(|r| r.logical_id.as_str()),
            overrides,
        )
    }

    /// Functions keyed by logical ID, using default options.
    ///
    /// Resources that fail to build are omitted; use [`Template::extract`] to
    /// see why.
    #[must_use]
    pub fn functions(&self) -> HashMap<String, Function> {
        self.extract(&ExtractionOptions::default()).into_map()
    }

    /// Functions in declaration order, using default options.
    #[must_use]
    pub fn ordered_functions(&self) -> Vec<Function> {
        self.extract(&ExtractionOptions::default()).functions
    }

    /// Extract every function plus diagnostics.
    #[must_use]
    pub fn extract(&self, options: &ExtractionOptions) -> Extraction {
        let context = self.resolution_context(&options.overrides);
        let resolver = Resolver::new(&context);
        let mut extraction = Extraction {
            functions: Vec::new(),
            diagnostics: self.skipped.clone(),
        };

        for candidate in classify(&self.resources, &self.globals) {
            let logical_id = candidate.logical_id();
            let condition = candidate.resource.condition.as_deref();

            if let (Some(name), true) = (condition, options.skip_false_conditions) {
                match resolver.evaluate_condition(name) {
                    Ok(true) => {}
                    Ok(false) => {
                        debug!("Skipping {logical_id}: condition {name} is false");
                        continue;
                    }
                    Err(source) => {
                        extraction.diagnostics.push(Diagnostic::warning(
                            logical_id,
                            "Condition",
                            BuildError::resolution("Condition", source),
                        ));
                    }
                }
            }

            match build(logical_id, candidate.kind, &candidate.properties, &resolver) {
                Ok(built) => {
                    for dropped in built.warnings {
                        warn!("{logical_id}: dropped {}: {}", dropped.property, dropped.error);
                        extraction
                            .diagnostics
                            .push(Diagnostic::warning(logical_id, dropped.property, dropped.error));
                    }
                    let mut function = built.function;
                    function.condition = condition.map(str::to_string);
                    extraction.functions.push(function);
                }
                Err(error) => {
                    warn!("{logical_id}: {error}");
                    extraction.diagnostics.push(Diagnostic::error(logical_id, error));
                }
            }
        }

        debug!(
            "Extracted {} function(s) with {} diagnostic(s)",
            extraction.functions.len(),
            extraction.diagnostics.len()
        );
        extraction
    }
}
