//! Document decoding: text → [`Template`].
//!
//! Decoding runs in four steps:
//!
//! 1. Parse the text (YAML or JSON) into a `serde_yaml::Value` tree. Mapping
//!    keys keep their document order and duplicate keys are rejected.
//! 2. Rewrite short-form intrinsic tags (`!Ref Env`, `!Sub ...`, `!GetAtt a.b`)
//!    into their long-form single-key mappings so the resolver only ever sees
//!    one representation.
//! 3. In strict mode, reject unknown top-level and resource-level keys and
//!    malformed resource entries. The default is non-strict: unknown keys are
//!    ignored and a resource entry without a usable `Type` or `Properties` is
//!    skipped with a warning.
//! 4. Decode the known sections into typed structures.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::globals::Globals;
use super::{Diagnostic, Parameter, Resource, Template, TemplateError};

/// Top-level keys of a CloudFormation/SAM template.
const TOP_LEVEL_KEYS: &[&str] = &[
    "AWSTemplateFormatVersion",
    "Transform",
    "Description",
    "Metadata",
    "Parameters",
    "Rules",
    "Mappings",
    "Conditions",
    "Globals",
    "Resources",
    "Outputs",
];

/// Keys allowed on a resource entry.
const RESOURCE_KEYS: &[&str] = &[
    "Type",
    "Properties",
    "Condition",
    "DependsOn",
    "Metadata",
    "DeletionPolicy",
    "UpdateReplacePolicy",
    "UpdatePolicy",
    "CreationPolicy",
];

/// Options controlling how a template document is decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Reject unknown top-level and resource-level keys instead of ignoring them.
    pub strict: bool,
}

impl DecoderOptions {
    /// Non-strict decoding (unknown keys tolerated).
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            strict: false,
        }
    }

    /// Strict decoding (unknown keys rejected).
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            strict: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTemplate {
    #[serde(rename = "Description", default)]
    description: Option<String>,
    #[serde(rename = "Transform", default)]
    transform: Option<Value>,
    #[serde(rename = "Parameters", default)]
    parameters: Option<BTreeMap<String, Parameter>>,
    #[serde(rename = "Mappings", default)]
    mappings: Option<BTreeMap<String, Value>>,
    #[serde(rename = "Conditions", default)]
    conditions: Option<BTreeMap<String, Value>>,
    #[serde(rename = "Globals", default)]
    globals: Option<BTreeMap<String, Value>>,
    #[serde(rename = "Resources", default)]
    resources: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    #[serde(rename = "Type")]
    resource_type: String,
    #[serde(rename = "Properties", default)]
    properties: Option<Value>,
    #[serde(rename = "Condition", default)]
    condition: Option<String>,
    #[serde(rename = "DependsOn", default)]
    depends_on: Option<Value>,
}

/// Decode template text.
pub(super) fn decode(text: &str, options: &DecoderOptions) -> Result<Template, TemplateError> {
    let root: Value = serde_yaml::from_str(text)?;
    let root = normalize_short_form(root);

    let Some(top) = root.as_mapping() else {
        return Err(TemplateError::Decode {
            reason: "template root must be a mapping".to_string(),
        });
    };
    if options.strict {
        check_known_keys(top, TOP_LEVEL_KEYS, "template")?;
    }

    let raw: RawTemplate = serde_yaml::from_value(root)?;
    let (resources, skipped) = decode_resources(raw.resources, options)?;

    let parameters = raw
        .parameters
        .unwrap_or_default()
        .into_iter()
        .map(|(name, mut parameter)| {
            parameter.name.clone_from(&name);
            (name, parameter)
        })
        .collect();

    let template = Template {
        description: raw.description,
        transforms: transforms(raw.transform.as_ref()),
        parameters,
        mappings: raw.mappings.unwrap_or_default(),
        conditions: raw.conditions.unwrap_or_default(),
        globals: Globals::from_sections(raw.globals.unwrap_or_default())?,
        resources,
        skipped,
        base_dir: None,
    };
    debug!(
        "Decoded template with {} resources, {} parameters",
        template.resources.len(),
        template.parameters.len()
    );
    Ok(template)
}

fn decode_resources(
    section: Option<Value>,
    options: &DecoderOptions,
) -> Result<(Vec<Resource>, Vec<Diagnostic>), TemplateError> {
    let entries = match section {
        None => return Err(TemplateError::MissingResources),
        Some(Value::Null) => return Err(TemplateError::EmptyResources),
        Some(Value::Mapping(entries)) => entries,
        Some(other) => {
            return Err(TemplateError::InvalidSection {
                section: "Resources".to_string(),
                reason: format!("expected a mapping, found {}", crate::intrinsics::kind_of(&other)),
            });
        }
    };
    if entries.is_empty() {
        return Err(TemplateError::EmptyResources);
    }

    let mut resources = Vec::with_capacity(entries.len());
    let mut skipped = Vec::new();
    for (key, value) in entries {
        let Some(logical_id) = key.as_str().map(str::to_string) else {
            return Err(TemplateError::InvalidSection {
                section: "Resources".to_string(),
                reason: "logical IDs must be strings".to_string(),
            });
        };
        let location = format!("Resources.{logical_id}");

        if options.strict {
            if let Some(fields) = value.as_mapping() {
                check_known_keys(fields, RESOURCE_KEYS, &location)?;
            }
        }

        match decode_resource(logical_id.clone(), value) {
            Ok(resource) => resources.push(resource),
            Err(reason) if !options.strict => {
                warn!("Skipping {location}: {reason}");
                skipped.push(Diagnostic::malformed(logical_id, reason));
            }
            Err(reason) => {
                return Err(TemplateError::InvalidSection {
                    section: location,
                    reason,
                });
            }
        }
    }
    Ok((resources, skipped))
}

fn decode_resource(logical_id: String, value: Value) -> Result<Resource, String> {
    let raw: RawResource = serde_yaml::from_value(value).map_err(|e| e.to_string())?;

    let properties = match raw.properties {
        None | Some(Value::Null) => Value::Mapping(Mapping::new()),
        Some(props @ Value::Mapping(_)) => props,
        Some(other) => {
            return Err(format!(
                "Properties must be a mapping, found {}",
                crate::intrinsics::kind_of(&other)
            ));
        }
    };

    Ok(Resource {
        logical_id,
        resource_type: raw.resource_type,
        properties,
        condition: raw.condition,
        depends_on: string_list(raw.depends_on.as_ref()),
    })
}

fn check_known_keys(map: &Mapping, known: &[&str], location: &str) -> Result<(), TemplateError> {
    for key in map.keys() {
        let name = key.as_str().unwrap_or_default();
        if !known.contains(&name) {
            return Err(TemplateError::UnknownField {
                field: crate::intrinsics::scalar_to_string(key).unwrap_or_default(),
                location: location.to_string(),
            });
        }
    }
    Ok(())
}

/// `Transform` is either a single name or a list of names.
fn transforms(value: Option<&Value>) -> Vec<String> {
    string_list(value)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(single)) => vec![single.clone()],
        Some(Value::Sequence(items)) => {
            items.iter().filter_map(|item| item.as_str().map(str::to_string)).collect()
        }
        _ => Vec::new(),
    }
}

/// Rewrite short-form tags (`!Ref x`) into long-form mappings (`{Ref: x}`).
///
/// Unknown tags are dropped and their inner value kept.
pub(crate) fn normalize_short_form(value: Value) -> Value {
    match value {
        Value::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            let name = tag.trim_start_matches('!');
            let inner = normalize_short_form(tagged.value);
            let key = match name {
                "Ref" | "Condition" => name.to_string(),
                "GetAtt" | "Sub" | "Join" | "FindInMap" | "If" | "Select" | "Split" | "Equals"
                | "And" | "Or" | "Not" | "Base64" | "Cidr" | "GetAZs" | "ImportValue"
                | "Transform" | "Length" | "ToJsonString" => format!("Fn::{name}"),
                _ => return inner,
            };
            let mut call = Mapping::with_capacity(1);
            call.insert(Value::String(key), inner);
            Value::Mapping(call)
        }
        Value::Mapping(map) => Value::Mapping(
            map.into_iter().map(|(k, v)| (k, normalize_short_form(v))).collect(),
        ),
        Value::Sequence(items) => {
            Value::Sequence(items.into_iter().map(normalize_short_form).collect())
        }
        scalar => scalar,
    }
}
