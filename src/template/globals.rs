//! The SAM `Globals` section and the defaults-then-overrides merge.
//!
//! Globals are keyed by SAM section name (`Function`, `Api`, `HttpApi`,
//! `SimpleTable`, `StateMachine`, `LayerVersion`). A section applies to the
//! matching `AWS::Serverless::*` type. A section may also be keyed by the full
//! resource type name, which is how non-SAM types can be given defaults.
//!
//! [`merge_properties`] never mutates the Globals tree: it builds a fresh
//! effective-properties tree per resource.

use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

use super::TemplateError;
use crate::intrinsics::is_intrinsic;

/// Parsed `Globals` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Globals {
    sections: BTreeMap<String, Mapping>,
}

impl Globals {
    pub(super) fn from_sections(sections: BTreeMap<String, Value>) -> Result<Self, TemplateError> {
        let mut parsed = BTreeMap::new();
        for (name, value) in sections {
            match value {
                Value::Mapping(defaults) => {
                    parsed.insert(name, defaults);
                }
                Value::Null => {}
                other => {
                    return Err(TemplateError::InvalidSection {
                        section: format!("Globals.{name}"),
                        reason: format!(
                            "expected a mapping, found {}",
                            crate::intrinsics::kind_of(&other)
                        ),
                    });
                }
            }
        }
        Ok(Self {
            sections: parsed,
        })
    }

    /// Defaults that apply to resources of `resource_type`, if any.
    #[must_use]
    pub fn defaults_for(&self, resource_type: &str) -> Option<&Mapping> {
        sam_section(resource_type)
            .and_then(|section| self.sections.get(section))
            .or_else(|| self.sections.get(resource_type))
    }

    /// Raw section by name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Mapping> {
        self.sections.get(name)
    }

    /// Whether no Globals were declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// SAM Globals section name for a resource type.
#[must_use]
pub fn sam_section(resource_type: &str) -> Option<&'static str> {
    match resource_type {
        "AWS::Serverless::Function" => Some("Function"),
        "AWS::Serverless::Api" => Some("Api"),
        "AWS::Serverless::HttpApi" => Some("HttpApi"),
        "AWS::Serverless::SimpleTable" => Some("SimpleTable"),
        "AWS::Serverless::StateMachine" => Some("StateMachine"),
        "AWS::Serverless::LayerVersion" => Some("LayerVersion"),
        _ => None,
    }
}

/// Effective properties for a resource: `defaults` overlaid by `properties`.
///
/// Mappings merge key by key at every depth with the resource side winning.
/// Scalars and sequences from the resource replace the default wholesale.
/// Intrinsic calls are leaves on either side.
#[must_use]
pub fn merge_properties(defaults: Option<&Mapping>, properties: &Value) -> Value {
    match defaults {
        Some(defaults) => deep_merge(&Value::Mapping(defaults.clone()), properties),
        None => properties.clone(),
    }
}

fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map))
            if !is_intrinsic(base) && !is_intrinsic(overlay) =>
        {
            let mut merged = base_map.clone();
            for (key, value) in overlay_map {
                let combined = match base_map.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), combined);
            }
            Value::Mapping(merged)
        }
        (_, overlay) => overlay.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn globals(text: &str) -> Globals {
        let sections: BTreeMap<String, Value> = serde_yaml::from_str(text).unwrap();
        Globals::from_sections(sections).unwrap()
    }

    #[test]
    fn test_defaults_for_serverless_function() {
        let globals = globals("Function:\n  Timeout: 30\nApi:\n  Cors: '*'\n");
        let defaults = globals.defaults_for("AWS::Serverless::Function").unwrap();
        assert_eq!(defaults.get("Timeout"), Some(&yaml("30")));
        assert!(globals.defaults_for("AWS::Lambda::Function").is_none());
        assert!(globals.defaults_for("AWS::Serverless::Api").is_some());
    }

    #[test]
    fn test_defaults_by_full_type_name() {
        let globals = globals("AWS::Lambda::Function:\n  MemorySize: 512\n");
        assert!(globals.defaults_for("AWS::Lambda::Function").is_some());
    }

    #[test]
    fn test_globals_section_must_be_mapping() {
        let sections: BTreeMap<String, Value> = serde_yaml::from_str("Function: [1]").unwrap();
        assert!(Globals::from_sections(sections).is_err());
    }

    #[test]
    fn test_resource_scalar_wins() {
        let defaults = yaml("Timeout: 30\nRuntime: python3.12");
        let merged = merge_properties(defaults.as_mapping(), &yaml("Timeout: 5"));
        assert_eq!(merged, yaml("Timeout: 5\nRuntime: python3.12"));
    }

    #[test]
    fn test_environment_variables_merge() {
        let defaults = yaml("Environment:\n  Variables:\n    LOG_LEVEL: info\n    REGION: x\n");
        let props = yaml("Environment:\n  Variables:\n    LOG_LEVEL: debug\n    FOO: bar\n");
        let merged = merge_properties(defaults.as_mapping(), &props);
        assert_eq!(
            merged,
            yaml("Environment:\n  Variables:\n    LOG_LEVEL: debug\n    REGION: x\n    FOO: bar\n")
        );
    }

    #[test]
    fn test_sequences_are_replaced() {
        let defaults = yaml("Layers: [a, b]");
        let merged = merge_properties(defaults.as_mapping(), &yaml("Layers: [c]"));
        assert_eq!(merged, yaml("Layers: [c]"));
    }

    #[test]
    fn test_intrinsics_are_opaque() {
        let defaults = yaml("Environment:\n  Variables:\n    A: '1'\n");
        let props = yaml("Environment:\n  Variables:\n    Fn::If: [IsProd, {A: '2'}, {B: '3'}]\n");
        let merged = merge_properties(defaults.as_mapping(), &props);
        assert_eq!(merged, props);
    }

    #[test]
    fn test_globals_untouched_by_merge() {
        let defaults = yaml("Environment:\n  Variables:\n    A: '1'\n");
        let snapshot = defaults.clone();
        let _ = merge_properties(defaults.as_mapping(), &yaml("Environment:\n  Variables:\n    B: '2'\n"));
        assert_eq!(defaults, snapshot);
    }
}
