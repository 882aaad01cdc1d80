//! Selection of function-bearing resources.

use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::{Globals, Resource, merge_properties};
use crate::function::FunctionKind;

/// A function resource with Globals applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<'t> {
    /// The resource as declared
    pub resource: &'t Resource,
    /// Which function type it is
    pub kind: FunctionKind,
    /// Globals defaults overlaid by the resource's own properties
    pub properties: Value,
}

impl Candidate<'_> {
    /// Logical ID of the underlying resource.
    #[must_use]
    pub fn logical_id(&self) -> &str {
        &self.resource.logical_id
    }
}

/// Properties that each name the whole code location of a function.
const CODE_KEYS: &[&str] = &["CodeUri", "InlineCode", "ImageUri", "Code"];

/// Globals defaults minus any code key, when the resource names its own code.
///
/// Code keys are alternatives, not nested settings: an inherited `CodeUri`
/// must not shadow a resource's `InlineCode` or `ImageUri`.
fn effective_defaults(defaults: Option<&Mapping>, properties: &Value) -> Option<Mapping> {
    let defaults = defaults?;
    let declares_code = CODE_KEYS.iter().any(|key| properties.get(key).is_some());
    let mut defaults = defaults.clone();
    if declares_code {
        for key in CODE_KEYS {
            defaults.remove(*key);
        }
    }
    Some(defaults)
}

/// Pick out function resources, in declaration order, and compute their
/// effective properties.
#[must_use]
pub fn classify<'t>(resources: &'t [Resource], globals: &Globals) -> Vec<Candidate<'t>> {
    resources
        .iter()
        .filter_map(|resource| {
            let Some(kind) = FunctionKind::from_resource_type(&resource.resource_type) else {
                debug!("Skipping {} ({})", resource.logical_id, resource.resource_type);
                return None;
            };
            let defaults = effective_defaults(globals.defaults_for(&resource.resource_type), &resource.properties);
            Some(Candidate {
                resource,
                kind,
                properties: merge_properties(defaults.as_ref(), &resource.properties),
            })
        })
        .collect()
}
