//! Template `Parameters` entries.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fmt;

use crate::intrinsics::{ResolutionError, scalar_to_string};

/// Declared type of a template parameter.
///
/// Only the distinction between scalar strings, numbers and lists matters
/// for resolution; any other declared type (SSM parameter types, AWS-specific
/// types) is kept verbatim and treated as a string, or as a list when it is
/// written `List<...>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParameterType {
    /// `String`
    String,
    /// `Number`
    Number,
    /// `CommaDelimitedList`
    CommaDelimitedList,
    /// `List<Number>`, `List<AWS::EC2::Subnet::Id>`, ...
    List(String),
    /// Anything else, kept as written
    Other(String),
}

impl ParameterType {
    /// Whether values of this type resolve to a list.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::CommaDelimitedList | Self::List(_))
    }
}

impl From<String> for ParameterType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "String" => Self::String,
            "Number" => Self::Number,
            "CommaDelimitedList" => Self::CommaDelimitedList,
            list if list.starts_with("List<") && list.ends_with('>') => {
                Self::List(list["List<".len()..list.len() - 1].to_string())
            }
            _ => Self::Other(value),
        }
    }
}

impl From<ParameterType> for String {
    fn from(value: ParameterType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "String"),
            Self::Number => write!(f, "Number"),
            Self::CommaDelimitedList => write!(f, "CommaDelimitedList"),
            Self::List(element) => write!(f, "List<{element}>"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

fn default_parameter_type() -> ParameterType {
    ParameterType::String
}

/// A single entry of the `Parameters` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name (the key in `Parameters`)
    #[serde(skip)]
    pub name: String,

    /// Declared type
    #[serde(rename = "Type", default = "default_parameter_type")]
    pub parameter_type: ParameterType,

    /// Value used when no override is supplied
    #[serde(rename = "Default", default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Values the parameter is restricted to
    #[serde(rename = "AllowedValues", default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<Value>>,

    /// Regular expression every value must match in full
    #[serde(rename = "AllowedPattern", default, skip_serializing_if = "Option::is_none")]
    pub allowed_pattern: Option<String>,

    /// Free-form description
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Parameter {
    /// Validate a textual value against this declaration and shape it for `Ref`.
    ///
    /// List types split on commas into a sequence of trimmed strings, and
    /// `AllowedValues`/`AllowedPattern` apply to each element; every other
    /// type yields a string.
    ///
    /// # Errors
    ///
    /// Fails with [`ResolutionError::InvalidParameterValue`] when the value
    /// is not in `AllowedValues`, does not match `AllowedPattern`, or a
    /// `Number` parameter is not numeric.
    pub fn accept(&self, name: &str, value: &str) -> Result<Value, ResolutionError> {
        let rejected = |reason: String| ResolutionError::InvalidParameterValue {
            name: name.to_string(),
            value: value.to_string(),
            reason,
        };

        let items: Vec<&str> = if self.parameter_type.is_list() {
            value.split(',').map(str::trim).collect()
        } else {
            vec![value]
        };

        if let Some(allowed) = &self.allowed_values {
            let permitted: Vec<String> = allowed.iter().filter_map(scalar_to_string).collect();
            if let Some(item) = items.iter().find(|item| !permitted.iter().any(|candidate| candidate == *item)) {
                return Err(rejected(format!(
                    "'{item}' is not one of the allowed values [{}]",
                    permitted.join(", ")
                )));
            }
        }

        if let Some(pattern) = &self.allowed_pattern {
            let anchored = Regex::new(&format!("^(?:{pattern})$"))
                .map_err(|e| rejected(format!("AllowedPattern '{pattern}' is not a valid pattern: {e}")))?;
            if let Some(item) = items.iter().find(|item| !anchored.is_match(item)) {
                return Err(rejected(format!("'{item}' does not match AllowedPattern '{pattern}'")));
            }
        }

        match &self.parameter_type {
            ParameterType::Number if value.trim().parse::<f64>().is_err() => {
                Err(rejected("expected a number".to_string()))
            }
            list if list.is_list() => Ok(Value::Sequence(
                items.into_iter().map(|item| Value::String(item.to_string())).collect(),
            )),
            _ => Ok(Value::String(value.to_string())),
        }
    }
}
