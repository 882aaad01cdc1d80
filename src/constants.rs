//! Global constants used throughout the lambda-local codebase.
//!
//! Defaults that mirror what AWS applies when a template leaves a value
//! unset, plus the placeholder identity used for pseudo-parameters when no
//! profile or flag supplies one.

/// Function timeout in seconds when neither the resource nor Globals set `Timeout`.
pub const DEFAULT_TIMEOUT_SECONDS: u32 = 3;

/// Function memory in MB when neither the resource nor Globals set `MemorySize`.
pub const DEFAULT_MEMORY_MB: u32 = 128;

/// Instruction set architecture when `Architectures` is unset.
pub const DEFAULT_ARCHITECTURE: &str = "x86_64";

/// Region used for `AWS::Region` when nothing else is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Account id used for `AWS::AccountId`. Matches the placeholder SAM uses locally.
pub const DEFAULT_ACCOUNT_ID: &str = "123456789012";

/// Stack name used for `AWS::StackName` when nothing else is configured.
pub const DEFAULT_STACK_NAME: &str = "lambda-local";

/// Port the invocation server listens on by default.
pub const DEFAULT_PORT: u16 = 3001;

/// Profile name used when `--profile` is not given.
pub const DEFAULT_PROFILE: &str = "default";

/// SAM transform identifier.
pub const SAM_TRANSFORM: &str = "AWS::Serverless-2016-10-31";

/// Resource type of SAM functions.
pub const SERVERLESS_FUNCTION_TYPE: &str = "AWS::Serverless::Function";

/// Resource type of plain CloudFormation Lambda functions.
pub const LAMBDA_FUNCTION_TYPE: &str = "AWS::Lambda::Function";
