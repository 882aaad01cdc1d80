//! Resolution context for intrinsic evaluation.
//!
//! A [`ResolutionContext`] borrows the Parameters, Mappings, Conditions and
//! resource logical IDs of a [`Template`](crate::template::Template) and pairs
//! them with caller-supplied [`ContextOverrides`]. It is built once per
//! extraction pass and never mutated afterwards.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::constants::{DEFAULT_ACCOUNT_ID, DEFAULT_REGION, DEFAULT_STACK_NAME};
use crate::template::Parameter;

/// Values for the `AWS::*` pseudo-parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PseudoParameters {
    /// `AWS::Region`
    pub region: String,
    /// `AWS::AccountId`
    pub account_id: String,
    /// `AWS::StackName`
    pub stack_name: String,
}

impl Default for PseudoParameters {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            account_id: DEFAULT_ACCOUNT_ID.to_string(),
            stack_name: DEFAULT_STACK_NAME.to_string(),
        }
    }
}

impl PseudoParameters {
    /// `AWS::Partition`, derived from the region prefix.
    #[must_use]
    pub fn partition(&self) -> &'static str {
        if self.region.starts_with("cn-") {
            "aws-cn"
        } else if self.region.starts_with("us-gov-") {
            "aws-us-gov"
        } else {
            "aws"
        }
    }

    /// `AWS::URLSuffix`, derived from the region prefix.
    #[must_use]
    pub fn url_suffix(&self) -> &'static str {
        if self.region.starts_with("cn-") {
            "amazonaws.com.cn"
        } else {
            "amazonaws.com"
        }
    }

    /// `AWS::StackId`. Stacks are never created, so the trailing id is fixed.
    #[must_use]
    pub fn stack_id(&self) -> String {
        format!(
            "arn:{}:cloudformation:{}:{}:stack/{}/00000000-0000-0000-0000-000000000000",
            self.partition(),
            self.region,
            self.account_id,
            self.stack_name
        )
    }

    /// Resolve a pseudo-parameter by name.
    ///
    /// Returns `None` for names that are not pseudo-parameters. `AWS::NoValue`
    /// is handled by the resolver and is not a value here.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let value = match name {
            "AWS::Region" => Value::String(self.region.clone()),
            "AWS::AccountId" => Value::String(self.account_id.clone()),
            "AWS::StackName" => Value::String(self.stack_name.clone()),
            "AWS::StackId" => Value::String(self.stack_id()),
            "AWS::Partition" => Value::String(self.partition().to_string()),
            "AWS::URLSuffix" => Value::String(self.url_suffix().to_string()),
            "AWS::NotificationARNs" => Value::Sequence(Vec::new()),
            _ => return None,
        };
        Some(value)
    }
}

/// Pseudo-parameter names known to [`PseudoParameters::lookup`], plus `AWS::NoValue`.
pub const PSEUDO_PARAMETER_NAMES: &[&str] = &[
    "AWS::Region",
    "AWS::AccountId",
    "AWS::StackName",
    "AWS::StackId",
    "AWS::Partition",
    "AWS::URLSuffix",
    "AWS::NotificationARNs",
    "AWS::NoValue",
];

/// Caller-supplied values layered over the template.
///
/// These usually come from the command line and the profile selected in the
/// configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextOverrides {
    /// Parameter values that replace the template defaults
    pub parameters: BTreeMap<String, String>,
    /// Pseudo-parameter values
    pub pseudo: PseudoParameters,
}

impl ContextOverrides {
    /// Create overrides with default pseudo-parameters and no parameter values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override a single parameter value.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Set the region used for `AWS::Region`.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.pseudo.region = region.into();
        self
    }

    /// Set the stack name used for `AWS::StackName`.
    #[must_use]
    pub fn with_stack_name(mut self, stack_name: impl Into<String>) -> Self {
        self.pseudo.stack_name = stack_name.into();
        self
    }

    /// Set the account id used for `AWS::AccountId`.
    #[must_use]
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.pseudo.account_id = account_id.into();
        self
    }
}

/// Read-only view over everything intrinsic evaluation may consult.
#[derive(Debug)]
pub struct ResolutionContext<'a> {
    pub(crate) parameters: &'a BTreeMap<String, Parameter>,
    pub(crate) mappings: &'a BTreeMap<String, Value>,
    pub(crate) conditions: &'a BTreeMap<String, Value>,
    pub(crate) resources: BTreeSet<&'a str>,
    pub(crate) overrides: &'a ContextOverrides,
}

impl<'a> ResolutionContext<'a> {
    /// Assemble a context from template sections and overrides.
    #[must_use]
    pub fn new(
        parameters: &'a BTreeMap<String, Parameter>,
        mappings: &'a BTreeMap<String, Value>,
        conditions: &'a BTreeMap<String, Value>,
        resources: impl IntoIterator<Item = &'a str>,
        overrides: &'a ContextOverrides,
    ) -> Self {
        Self {
            parameters,
            mappings,
            conditions,
            resources: resources.into_iter().collect(),
            overrides,
        }
    }

    /// The pseudo-parameter values in effect.
    #[must_use]
    pub fn pseudo(&self) -> &PseudoParameters {
        &self.overrides.pseudo
    }

    /// Whether `name` is a resource logical ID in the template.
    #[must_use]
    pub fn has_resource(&self, name: &str) -> bool {
        self.resources.contains(name)
    }

    /// Every name `Ref` could resolve, for "did you mean" suggestions.
    pub(crate) fn known_names(&self) -> Vec<&str> {
        self.parameters
            .keys()
            .map(String::as_str)
            .chain(self.resources.iter().copied())
            .chain(PSEUDO_PARAMETER_NAMES.iter().copied())
            .collect()
    }
}
