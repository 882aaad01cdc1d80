//! Normalized function definitions extracted from a template.
//!
//! A [`Function`] is the typed view of one `AWS::Serverless::Function` or
//! `AWS::Lambda::Function` resource after Globals have been applied and every
//! intrinsic has been resolved. It is what the invocation layer routes
//! requests to: handler, runtime, code location, limits, environment and the
//! event sources that trigger it.
//!
//! Functions are built by [`build`] and collected by
//! [`Template::extract`](crate::template::Template::extract).

mod builder;
pub mod error;
mod events;


pub use builder::{Built, PropertyWarning, build};
pub use error::BuildError;

use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::{LAMBDA_FUNCTION_TYPE, SERVERLESS_FUNCTION_TYPE};

/// The resource types that define functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FunctionKind {
    /// `AWS::Serverless::Function` (SAM)
    Serverless,
    /// `AWS::Lambda::Function` (plain CloudFormation)
    Lambda,
}

impl FunctionKind {
    /// Classify a resource type string.
    #[must_use]
    pub fn from_resource_type(resource_type: &str) -> Option<Self> {
        match resource_type {
            SERVERLESS_FUNCTION_TYPE => Some(Self::Serverless),
            LAMBDA_FUNCTION_TYPE => Some(Self::Lambda),
            _ => None,
        }
    }

    /// The resource type string.
    #[must_use]
    pub const fn resource_type(self) -> &'static str {
        match self {
            Self::Serverless => SERVERLESS_FUNCTION_TYPE,
            Self::Lambda => LAMBDA_FUNCTION_TYPE,
        }
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_type())
    }
}

/// Where a function's code lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CodeLocation {
    /// A path on disk, relative to the template unless absolute
    Local {
        /// Path as written in the template
        path: PathBuf,
    },
    /// A packaged archive in S3
    S3 {
        /// Bucket name
        bucket: String,
        /// Object key
        key: String,
        /// Object version, if pinned
        #[serde(skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },
    /// Source code embedded in the template
    Inline {
        /// The source text
        source: String,
    },
    /// A container image
    Image {
        /// Image URI
        uri: String,
    },
}

impl CodeLocation {
    /// Resolve a local code path against the template directory.
    ///
    /// Returns `None` for non-local locations.
    #[must_use]
    pub fn local_path(&self, base_dir: Option<&Path>) -> Option<PathBuf> {
        match self {
            Self::Local {
                path,
            } => Some(match base_dir {
                Some(base) if path.is_relative() => base.join(path),
                _ => path.clone(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for CodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local {
                path,
            } => write!(f, "{}", path.display()),
            Self::S3 {
                bucket,
                key,
                version,
            } => match version {
                Some(version) => write!(f, "s3://{bucket}/{key}?versionId={version}"),
                None => write!(f, "s3://{bucket}/{key}"),
            },
            Self::Inline {
                source,
            } => write!(f, "<inline, {} bytes>", source.len()),
            Self::Image {
                uri,
            } => write!(f, "image {uri}"),
        }
    }
}

/// Flavor of HTTP API an `Api`/`HttpApi` event attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiKind {
    /// API Gateway REST API (`Api` event)
    Rest,
    /// API Gateway HTTP API (`HttpApi` event)
    Http,
}

/// Source of a stream event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// Kinesis data stream
    Kinesis,
    /// DynamoDB table stream
    DynamoDb,
}

/// Event-source specific configuration of a trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerKind {
    /// HTTP route
    HttpApi {
        /// Route path, e.g. `/hello/{name}`
        path: String,
        /// Lower-case HTTP method, or `any`
        method: String,
        /// REST or HTTP API
        api: ApiKind,
        /// Explicit API the route belongs to
        #[serde(skip_serializing_if = "Option::is_none")]
        api_id: Option<String>,
    },
    /// Scheduled invocation
    Schedule {
        /// `rate(...)` or `cron(...)` expression
        expression: String,
        /// Whether the schedule is active
        enabled: bool,
        /// Constant JSON input passed to the function
        #[serde(skip_serializing_if = "Option::is_none")]
        input: Option<String>,
    },
    /// SQS queue subscription
    Queue {
        /// Queue ARN (or placeholder)
        queue: String,
        /// Maximum records per invocation
        #[serde(skip_serializing_if = "Option::is_none")]
        batch_size: Option<u32>,
    },
    /// SNS topic subscription
    Topic {
        /// Topic ARN (or placeholder)
        topic: String,
        /// Message filter policy
        #[serde(skip_serializing_if = "Option::is_none")]
        filter_policy: Option<Value>,
    },
    /// S3 bucket notification
    Storage {
        /// Bucket name (or placeholder)
        bucket: String,
        /// Event names, e.g. `s3:ObjectCreated:*`
        events: Vec<String>,
        /// Key filter rules
        #[serde(skip_serializing_if = "Option::is_none")]
        filter: Option<Value>,
    },
    /// Kinesis or DynamoDB stream
    Stream {
        /// Stream ARN (or placeholder)
        stream: String,
        /// Which service produces the stream
        source: StreamKind,
        /// `TRIM_HORIZON`, `LATEST`, ...
        #[serde(skip_serializing_if = "Option::is_none")]
        starting_position: Option<String>,
        /// Maximum records per invocation
        #[serde(skip_serializing_if = "Option::is_none")]
        batch_size: Option<u32>,
    },
    /// Any other event type, with its resolved properties kept as-is
    Custom {
        /// Event `Type` as written
        event_type: String,
        /// Resolved `Properties`
        properties: Value,
    },
}

/// One entry of a function's `Events`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trigger {
    /// Event name (the key under `Events`)
    pub name: String,
    /// Event-source configuration
    #[serde(flatten)]
    pub kind: TriggerKind,
}

/// A fully resolved function definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    /// Logical ID of the resource
    pub logical_id: String,
    /// Which resource type it was declared as
    pub kind: FunctionKind,
    /// Handler entry point, e.g. `index.handler`
    pub handler: String,
    /// Runtime identifier, e.g. `nodejs18.x`
    pub runtime: String,
    /// Code location
    pub code: CodeLocation,
    /// Memory in MB
    pub memory_size: u32,
    /// Timeout in seconds
    pub timeout: u32,
    /// Environment variables
    pub environment: BTreeMap<String, String>,
    /// Event sources, in declaration order
    pub triggers: Vec<Trigger>,
    /// Condition guarding the resource. The function is included regardless;
    /// consumers decide whether to honor it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Explicit `FunctionName`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// `Description`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Instruction set architectures
    pub architectures: Vec<String>,
    /// Layer ARNs or logical IDs
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<String>,
}

impl Function {
    /// Name the function would be invoked by: `FunctionName` if set, else the logical ID.
    #[must_use]
    pub fn invocation_name(&self) -> &str {
        self.function_name.as_deref().unwrap_or(&self.logical_id)
    }

    /// HTTP triggers only.
    pub fn http_routes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.triggers.iter().filter_map(|trigger| match &trigger.kind {
            TriggerKind::HttpApi {
                path,
                method,
                ..
            } => Some((path.as_str(), method.as_str())),
            _ => None,
        })
    }
}
