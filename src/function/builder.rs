//! Assembly of a [`Function`] from effective resource properties.
//!
//! Required properties (`Handler`, `Runtime`, a code location) abort the
//! build when they are missing or cannot be resolved. Optional properties
//! that fail to resolve are dropped and reported back as
//! [`PropertyWarning`]s so the rest of the function is still usable.

use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

use super::events::trigger_for;
use super::{BuildError, CodeLocation, Function, FunctionKind, Trigger};
use crate::constants::{DEFAULT_ARCHITECTURE, DEFAULT_MEMORY_MB, DEFAULT_TIMEOUT_SECONDS};
use crate::intrinsics::{Resolved, Resolver, is_intrinsic, kind_of, scalar_to_string};

/// An optional property that was dropped while building a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyWarning {
    /// Property path, e.g. `Environment.Variables.TABLE` or `Events.Upload`
    pub property: String,
    /// Why it was dropped
    pub error: BuildError,
}

/// A successfully built function plus anything dropped on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Built {
    /// The function
    pub function: Function,
    /// Optional properties that were dropped
    pub warnings: Vec<PropertyWarning>,
}

/// Build a [`Function`] from a resource's effective properties.
///
/// `properties` must already have Globals merged in; every intrinsic in it is
/// resolved through `resolver`.
///
/// # Errors
///
/// Fails when `Handler`, `Runtime` or the code location is missing, cannot be
/// resolved, or has the wrong shape, and when `Timeout`/`MemorySize` are not
/// whole numbers.
pub fn build(
    logical_id: &str,
    kind: FunctionKind,
    properties: &Value,
    resolver: &Resolver<'_>,
) -> Result<Built, BuildError> {
    let empty = Mapping::new();
    let props = match properties {
        Value::Mapping(map) => map,
        Value::Null => &empty,
        other => {
            return Err(BuildError::invalid_field(
                "Properties",
                format!("expected a mapping, found {}", kind_of(other)),
            ));
        }
    };

    let mut builder = FunctionBuilder {
        props,
        resolver: *resolver,
        warnings: Vec::new(),
    };

    let handler = builder.required_string("Handler")?;
    let runtime = builder.required_string("Runtime")?;
    let code = builder.code_location(kind)?;
    let timeout = builder.count("Timeout", DEFAULT_TIMEOUT_SECONDS)?;
    let memory_size = builder.count("MemorySize", DEFAULT_MEMORY_MB)?;

    let function_name = builder.optional_string("FunctionName");
    let description = builder.optional_string("Description");
    let architectures = builder
        .string_list("Architectures")
        .filter(|list| !list.is_empty())
        .unwrap_or_else(|| vec![DEFAULT_ARCHITECTURE.to_string()]);
    let layers = builder.string_list("Layers").unwrap_or_default();
    let environment = builder.environment();
    let triggers = match kind {
        FunctionKind::Serverless => builder.triggers(),
        FunctionKind::Lambda => Vec::new(),
    };

    debug!(
        "Built function {logical_id}: handler={handler}, runtime={runtime}, {} trigger(s), {} warning(s)",
        triggers.len(),
        builder.warnings.len()
    );

    Ok(Built {
        function: Function {
            logical_id: logical_id.to_string(),
            kind,
            handler,
            runtime,
            code,
            memory_size,
            timeout,
            environment,
            triggers,
            condition: None,
            function_name,
            description,
            architectures,
            layers,
        },
        warnings: builder.warnings,
    })
}

struct FunctionBuilder<'p, 'a> {
    props: &'p Mapping,
    resolver: Resolver<'a>,
    warnings: Vec<PropertyWarning>,
}

impl FunctionBuilder<'_, '_> {
    fn warn(&mut self, property: impl Into<String>, error: BuildError) {
        let property = property.into();
        debug!("Dropping {property}: {error}");
        self.warnings.push(PropertyWarning {
            property,
            error,
        });
    }

    /// Resolve a required field. Errors abort the build.
    fn resolve_required(&self, field: &str, raw: &Value) -> Result<Option<Value>, BuildError> {
        self.resolver
            .resolve(raw)
            .map(Resolved::into_value)
            .map_err(|source| BuildError::resolution(field, source))
    }

    /// Resolve an optional field. Errors drop the field with a warning.
    fn resolve_optional(&mut self, field: &str, raw: &Value) -> Option<Value> {
        match self.resolver.resolve(raw) {
            Ok(resolved) => resolved.into_value().filter(|value| !value.is_null()),
            Err(source) => {
                self.warn(field, BuildError::resolution(field, source));
                None
            }
        }
    }

    fn required_string(&self, field: &str) -> Result<String, BuildError> {
        let raw = self.props.get(field).ok_or_else(|| BuildError::missing(field))?;
        let value = self.resolve_required(field, raw)?.ok_or_else(|| BuildError::missing(field))?;
        match scalar_to_string(&value) {
            Some(text) if !text.trim().is_empty() => Ok(text),
            Some(_) => Err(BuildError::missing(field)),
            None if value.is_null() => Err(BuildError::missing(field)),
            None => Err(BuildError::invalid_field(
                field,
                format!("expected a string, found {}", kind_of(&value)),
            )),
        }
    }

    fn optional_string(&mut self, field: &str) -> Option<String> {
        let raw = self.props.get(field)?;
        let value = self.resolve_optional(field, raw)?;
        let text = scalar_to_string(&value);
        if text.is_none() {
            self.warn(
                field,
                BuildError::invalid_field(field, format!("expected a string, found {}", kind_of(&value))),
            );
        }
        text
    }

    /// `Timeout` and `MemorySize`: integers or numeric strings, falling back
    /// to `default` when absent.
    fn count(&mut self, field: &str, default: u32) -> Result<u32, BuildError> {
        let Some(raw) = self.props.get(field) else {
            return Ok(default);
        };
        let Some(value) = self.resolve_optional(field, raw) else {
            return Ok(default);
        };
        let parsed = match &value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        };
        match parsed {
            Some(n) if n > 0 => Ok(n),
            _ => Err(BuildError::invalid_field(
                field,
                format!(
                    "expected a positive whole number, found {}",
                    scalar_to_string(&value).unwrap_or_else(|| kind_of(&value).to_string())
                ),
            )),
        }
    }

    fn string_list(&mut self, field: &str) -> Option<Vec<String>> {
        let raw = self.props.get(field)?;
        let value = self.resolve_optional(field, raw)?;
        let items = match value {
            Value::Sequence(items) => items,
            single @ (Value::String(_) | Value::Number(_) | Value::Bool(_)) => vec![single],
            other => {
                self.warn(
                    field,
                    BuildError::invalid_field(field, format!("expected a list, found {}", kind_of(&other))),
                );
                return None;
            }
        };
        let mut list = Vec::with_capacity(items.len());
        for item in items {
            match scalar_to_string(&item) {
                Some(text) => list.push(text),
                None => self.warn(
                    field,
                    BuildError::invalid_field(
                        field,
                        format!("list entries must be strings, found {}", kind_of(&item)),
                    ),
                ),
            }
        }
        Some(list)
    }

    fn code_location(&self, kind: FunctionKind) -> Result<CodeLocation, BuildError> {
        if let Some(raw) = self.props.get("CodeUri") {
            let value = self.resolve_required("CodeUri", raw)?.ok_or_else(|| BuildError::missing("CodeUri"))?;
            return code_uri(&value);
        }
        if self.props.contains_key("InlineCode") {
            return Ok(CodeLocation::Inline {
                source: self.required_string("InlineCode")?,
            });
        }
        if self.props.contains_key("ImageUri") {
            return Ok(CodeLocation::Image {
                uri: self.required_string("ImageUri")?,
            });
        }
        if let Some(raw) = self.props.get("Code") {
            let value = self.resolve_required("Code", raw)?.ok_or_else(|| BuildError::missing("Code"))?;
            return lambda_code(&value);
        }
        Err(BuildError::missing(match kind {
            FunctionKind::Serverless => "CodeUri",
            FunctionKind::Lambda => "Code",
        }))
    }

    fn environment(&mut self) -> BTreeMap<String, String> {
        let mut environment = BTreeMap::new();
        let Some(raw) = self.props.get("Environment") else {
            return environment;
        };
        let Some(section) = self.opaque_container("Environment", raw) else {
            return environment;
        };
        let Some(raw_vars) = section.get("Variables") else {
            return environment;
        };
        let Some(variables) = self.opaque_container("Environment.Variables", raw_vars) else {
            return environment;
        };
        let Some(variables) = variables.as_mapping() else {
            self.warn(
                "Environment.Variables",
                BuildError::invalid_field(
                    "Environment.Variables",
                    format!("expected a mapping, found {}", kind_of(&variables)),
                ),
            );
            return environment;
        };

        for (name, raw_value) in variables {
            let Some(name) = scalar_to_string(name) else {
                continue;
            };
            let property = format!("Environment.Variables.{name}");
            match self.resolver.resolve_string(raw_value) {
                Ok(Some(value)) => {
                    environment.insert(name, value);
                }
                Ok(None) => {}
                Err(source) => self.warn(property.clone(), BuildError::resolution(property, source)),
            }
        }
        environment
    }

    /// Resolve `raw` only if it is itself an intrinsic call, leaving child
    /// values for the caller so one bad entry does not drop its siblings.
    fn opaque_container(&mut self, field: &str, raw: &Value) -> Option<Value> {
        if is_intrinsic(raw) {
            self.resolve_optional(field, raw)
        } else if raw.is_null() {
            None
        } else {
            Some(raw.clone())
        }
    }

    fn triggers(&mut self) -> Vec<Trigger> {
        let mut triggers = Vec::new();
        let Some(raw) = self.props.get("Events") else {
            return triggers;
        };
        let Some(events) = self.opaque_container("Events", raw) else {
            return triggers;
        };
        let Some(events) = events.as_mapping() else {
            self.warn(
                "Events",
                BuildError::invalid_field("Events", format!("expected a mapping, found {}", kind_of(&events))),
            );
            return triggers;
        };

        for (name, event) in events {
            let Some(name) = scalar_to_string(name) else {
                continue;
            };
            let property = format!("Events.{name}");
            match self.trigger(&name, &property, event) {
                Ok(trigger) => triggers.push(trigger),
                Err(error) => self.warn(property, error),
            }
        }
        triggers
    }

    fn trigger(&self, name: &str, property: &str, event: &Value) -> Result<Trigger, BuildError> {
        let resolved = self
            .resolver
            .resolve(event)
            .map_err(|source| BuildError::resolution(property, source))?;
        let Some(event) = resolved.into_value() else {
            return Err(BuildError::InvalidEvent {
                event: name.to_string(),
                reason: "event resolved to no value".to_string(),
            });
        };
        let event_type = event
            .get("Type")
            .and_then(scalar_to_string)
            .ok_or_else(|| BuildError::InvalidEvent {
                event: name.to_string(),
                reason: "missing required property 'Type'".to_string(),
            })?;
        let properties = event.get("Properties").cloned().unwrap_or(Value::Null);
        let kind = trigger_for(name, &event_type, &properties)?;
        Ok(Trigger {
            name: name.to_string(),
            kind,
        })
    }
}

/// `CodeUri`: a local path, an `s3://bucket/key` URI, or `{Bucket, Key, Version}`.
fn code_uri(value: &Value) -> Result<CodeLocation, BuildError> {
    match value {
        Value::String(uri) => {
            if let Some(rest) = uri.strip_prefix("s3://") {
                let (bucket, key) = rest
                    .split_once('/')
                    .filter(|(bucket, key)| !bucket.is_empty() && !key.is_empty())
                    .ok_or_else(|| BuildError::invalid_code(format!("'{uri}' is not of the form s3://bucket/key")))?;
                Ok(CodeLocation::S3 {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    version: None,
                })
            } else if uri.trim().is_empty() {
                Err(BuildError::invalid_code("CodeUri is empty"))
            } else {
                Ok(CodeLocation::Local {
                    path: PathBuf::from(uri),
                })
            }
        }
        Value::Mapping(map) => s3_object(map, "Bucket", "Key", "Version", "CodeUri"),
        other => Err(BuildError::invalid_code(format!(
            "CodeUri must be a string or mapping, found {}",
            kind_of(other)
        ))),
    }
}

/// `Code` on `AWS::Lambda::Function`.
fn lambda_code(value: &Value) -> Result<CodeLocation, BuildError> {
    let Some(map) = value.as_mapping() else {
        return Err(BuildError::invalid_code(format!(
            "Code must be a mapping, found {}",
            kind_of(value)
        )));
    };
    if let Some(source) = map.get("ZipFile").and_then(scalar_to_string) {
        return Ok(CodeLocation::Inline {
            source,
        });
    }
    if let Some(uri) = map.get("ImageUri").and_then(scalar_to_string) {
        return Ok(CodeLocation::Image {
            uri,
        });
    }
    s3_object(map, "S3Bucket", "S3Key", "S3ObjectVersion", "Code")
}

fn s3_object(
    map: &Mapping,
    bucket_key: &str,
    object_key: &str,
    version_key: &str,
    field: &str,
) -> Result<CodeLocation, BuildError> {
    let text = |key: &str| map.get(key).and_then(scalar_to_string).filter(|s| !s.is_empty());
    match (text(bucket_key), text(object_key)) {
        (Some(bucket), Some(key)) => Ok(CodeLocation::S3 {
            bucket,
            key,
            version: text(version_key),
        }),
        _ => Err(BuildError::invalid_code(format!(
            "{field} requires both {bucket_key} and {object_key}"
        ))),
    }
}
