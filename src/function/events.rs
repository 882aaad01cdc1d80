//! Mapping of `Events` entries onto [`TriggerKind`]s.
//!
//! Properties arrive here already resolved; this module only checks shape and
//! picks the variant.

use serde_yaml::{Mapping, Value};

use super::{ApiKind, BuildError, StreamKind, TriggerKind};
use crate::intrinsics::{kind_of, scalar_to_string};

/// Build the trigger for one event of type `event_type`.
pub(super) fn trigger_for(
    event: &str,
    event_type: &str,
    properties: &Value,
) -> Result<TriggerKind, BuildError> {
    let empty = Mapping::new();
    let props = match properties {
        Value::Mapping(map) => map,
        Value::Null => &empty,
        other => {
            return Err(invalid(event, format!("Properties must be a mapping, found {}", kind_of(other))));
        }
    };
    let fields = EventFields {
        event,
        props,
    };

    let kind = match event_type {
        "Api" => TriggerKind::HttpApi {
            path: fields.required("Path")?,
            method: fields.required("Method")?.to_ascii_lowercase(),
            api: ApiKind::Rest,
            api_id: fields.optional("RestApiId")?,
        },
        "HttpApi" => TriggerKind::HttpApi {
            path: fields.optional("Path")?.unwrap_or_else(|| "$default".to_string()),
            method: fields.optional("Method")?.map_or_else(|| "any".to_string(), |m| m.to_ascii_lowercase()),
            api: ApiKind::Http,
            api_id: fields.optional("ApiId")?,
        },
        "Schedule" => TriggerKind::Schedule {
            expression: fields.required("Schedule")?,
            enabled: fields.flag("Enabled")?.unwrap_or(true),
            input: fields.optional("Input")?,
        },
        "ScheduleV2" => TriggerKind::Schedule {
            expression: fields.required("ScheduleExpression")?,
            enabled: fields
                .optional("State")?
                .is_none_or(|state| !state.eq_ignore_ascii_case("DISABLED")),
            input: fields.optional("Input")?,
        },
        "SQS" => TriggerKind::Queue {
            queue: fields.required("Queue")?,
            batch_size: fields.count("BatchSize")?,
        },
        "SNS" => TriggerKind::Topic {
            topic: fields.required("Topic")?,
            filter_policy: props.get("FilterPolicy").cloned(),
        },
        "S3" => TriggerKind::Storage {
            bucket: fields.required("Bucket")?,
            events: fields.names("Events")?,
            filter: props.get("Filter").cloned(),
        },
        "Kinesis" | "DynamoDB" => TriggerKind::Stream {
            stream: fields.required("Stream")?,
            source: if event_type == "Kinesis" {
                StreamKind::Kinesis
            } else {
                StreamKind::DynamoDb
            },
            starting_position: fields.optional("StartingPosition")?,
            batch_size: fields.count("BatchSize")?,
        },
        other => TriggerKind::Custom {
            event_type: other.to_string(),
            properties: Value::Mapping(props.clone()),
        },
    };
    Ok(kind)
}

fn invalid(event: &str, reason: impl Into<String>) -> BuildError {
    BuildError::InvalidEvent {
        event: event.to_string(),
        reason: reason.into(),
    }
}

struct EventFields<'p> {
    event: &'p str,
    props: &'p Mapping,
}

impl EventFields<'_> {
    fn optional(&self, key: &str) -> Result<Option<String>, BuildError> {
        match self.props.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => scalar_to_string(value).map(Some).ok_or_else(|| {
                invalid(self.event, format!("{key} must be a scalar, found {}", kind_of(value)))
            }),
        }
    }

    fn required(&self, key: &str) -> Result<String, BuildError> {
        self.optional(key)?
            .filter(|value| !value.is_empty())
            .ok_or_else(|| invalid(self.event, format!("missing required property '{key}'")))
    }

    fn flag(&self, key: &str) -> Result<Option<bool>, BuildError> {
        match self.props.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(other) => Err(invalid(self.event, format!("{key} must be a boolean, found {}", kind_of(other)))),
        }
    }

    fn count(&self, key: &str) -> Result<Option<u32>, BuildError> {
        self.optional(key)?
            .map(|text| {
                text.trim()
                    .parse::<u32>()
                    .map_err(|_| invalid(self.event, format!("{key} must be a whole number, found '{text}'")))
            })
            .transpose()
    }

    /// A single name or a list of names.
    fn names(&self, key: &str) -> Result<Vec<String>, BuildError> {
        match self.props.get(key) {
            Some(Value::Sequence(items)) if !items.is_empty() => items
                .iter()
                .map(|item| {
                    scalar_to_string(item)
                        .ok_or_else(|| invalid(self.event, format!("{key} entries must be strings")))
                })
                .collect(),
            Some(Value::String(single)) => Ok(vec![single.clone()]),
            _ => Err(invalid(self.event, format!("missing required property '{key}'"))),
        }
    }
}
