//! Command-line interface for `lambda-local`.
//!
//! The binary loads a SAM/CloudFormation template, extracts every function
//! it declares, and prints the resulting catalog. It is the front end of a
//! local invocation server; `--port` is recorded in the output for that
//! server.
//!
//! # Examples
//!
//! ```bash
//! # Print the functions in template.yaml
//! lambda-local --template template.yaml
//!
//! # Use a named profile and override a parameter
//! lambda-local --template template.yaml --profile staging --parameter-overrides Env=prod
//!
//! # Machine-readable output, failing if any function cannot be built
//! lambda-local -t template.yaml --format json --fail-on-error
//! ```
//!
//! # Where values come from
//!
//! | Value | Flag | Config file | Built-in |
//! |-------|------|-------------|----------|
//! | `AWS::Region` | `--region` | `region` | `us-east-1` |
//! | `AWS::AccountId` | `--account-id` | `account_id` | `123456789012` |
//! | `AWS::StackName` | `--stack-name` | `stack_name` | `lambda-local` |
//! | Parameters | `--parameter-overrides` | `[.. .parameters]` | template `Default` |
//!
//! Flags win over the selected profile, which wins over `[defaults]`.

mod output;


pub use output::{OutputFormat, describe_trigger, render_json, render_text};

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::{GlobalConfig, ProfileSettings};
use crate::constants::{DEFAULT_PORT, DEFAULT_PROFILE};
use crate::core::LambdaLocalError;
use crate::intrinsics::ContextOverrides;
use crate::template::{DecoderOptions, ExtractionOptions, Template};

/// Runtime configuration derived from the command line.
///
/// Kept separate from [`Cli`] so tests can drive execution without touching
/// process-wide logging state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log level used when `RUST_LOG` is not set
    pub log_level: Option<String>,
    /// Configuration file to load instead of the default location
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Configuration with no log level and the default config path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over [`CliConfig::log_level`]. Calling this
    /// more than once is harmless.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level.as_deref().unwrap_or("info")));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Load a SAM/CloudFormation template and list the functions it defines.
#[derive(Parser, Debug)]
#[command(
    name = "lambda-local",
    about = "Inspect the functions declared in a SAM/CloudFormation template",
    version,
    long_about = "lambda-local loads a SAM/CloudFormation template, resolves its intrinsic functions, \
                  applies Globals, and prints a normalized catalog of the functions it declares."
)]
pub struct Cli {
    /// Path to the template file (YAML or JSON).
    #[arg(short, long, env = "LAMBDA_LOCAL_TEMPLATE", value_name = "PATH")]
    template: PathBuf,

    /// Port the local invocation server listens on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Configuration profile supplying region, account, stack name and parameters.
    #[arg(long, env = "LAMBDA_LOCAL_PROFILE", default_value = DEFAULT_PROFILE)]
    profile: String,

    /// Value for `AWS::Region`.
    #[arg(long)]
    region: Option<String>,

    /// Value for `AWS::StackName`.
    #[arg(long)]
    stack_name: Option<String>,

    /// Value for `AWS::AccountId`.
    #[arg(long)]
    account_id: Option<String>,

    /// Template parameter values, as `Name=Value`.
    ///
    /// May be given several times or with several values:
    /// `--parameter-overrides Env=prod LogLevel=debug`.
    #[arg(long, value_name = "KEY=VALUE", num_args = 1..)]
    parameter_overrides: Vec<String>,

    /// Reject unknown top-level and resource-level template keys.
    #[arg(long)]
    strict: bool,

    /// Leave out resources whose `Condition` evaluates to false.
    ///
    /// By default such resources are included and their condition is shown.
    #[arg(long)]
    skip_false_conditions: bool,

    /// Exit with an error if any function resource could not be built.
    #[arg(long)]
    fail_on_error: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Path to the configuration file (default `~/.lambda-local/config.toml`).
    #[arg(short, long, env = "LAMBDA_LOCAL_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Show debug logging.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Set up logging and run.
    ///
    /// # Errors
    ///
    /// Fails if the configuration or template cannot be loaded, an override
    /// is malformed, or `--fail-on-error` is set and a function failed to build.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Derive the runtime configuration from the flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        };
        CliConfig {
            log_level: Some(log_level.to_string()),
            config_path: self.config.clone(),
        }
    }

    /// Run with an explicit [`CliConfig`] and print the catalog to stdout.
    ///
    /// # Errors
    ///
    /// See [`Cli::execute`].
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let rendered = self.render(&config).await?;
        print!("{}", rendered.output);
        match rendered.error_count {
            0 => Ok(()),
            count if self.fail_on_error => Err(LambdaLocalError::ExtractionFailed {
                count,
            }
            .into()),
            _ => Ok(()),
        }
    }

    async fn render(&self, config: &CliConfig) -> Result<Rendered> {
        let global = GlobalConfig::load_with_optional(config.config_path.clone())
            .await
            .context("Failed to load configuration")?;
        let overrides = self.overrides(&global)?;
        debug!(
            "Resolving with region={}, account={}, stack={}, {} parameter override(s)",
            overrides.pseudo.region,
            overrides.pseudo.account_id,
            overrides.pseudo.stack_name,
            overrides.parameters.len()
        );

        let decoder = if self.strict {
            DecoderOptions::strict()
        } else {
            DecoderOptions::lenient()
        };
        let template = Template::load(&self.template, &decoder)
            .await
            .with_context(|| format!("Failed to load template {}", self.template.display()))?;

        let extraction = template.extract(&ExtractionOptions {
            overrides,
            skip_false_conditions: self.skip_false_conditions,
        });
        info!(
            "Found {} function(s) in {}",
            extraction.functions.len(),
            self.template.display()
        );

        let output = match self.format {
            OutputFormat::Text => render_text(&extraction, &self.template, self.port, template.base_dir()),
            OutputFormat::Json => render_json(&extraction, &self.template, self.port)?,
        };
        Ok(Rendered {
            output,
            error_count: extraction.errors().count(),
        })
    }

    /// Combine flags, the selected profile and `[defaults]`.
    fn overrides(&self, global: &GlobalConfig) -> Result<ContextOverrides> {
        let profile = global.profile(&self.profile)?;
        let flags = ProfileSettings {
            region: self.region.clone(),
            account_id: self.account_id.clone(),
            stack_name: self.stack_name.clone(),
            parameters: parse_parameter_overrides(&self.parameter_overrides)?,
        };
        Ok(flags.over(&profile).into_overrides())
    }
}

struct Rendered {
    output: String,
    error_count: usize,
}

/// Parse `Name=Value` arguments. Later entries win.
///
/// # Errors
///
/// Returns [`LambdaLocalError::InvalidOverride`] for an entry without `=` or
/// with an empty name.
pub fn parse_parameter_overrides(values: &[String]) -> Result<BTreeMap<String, String>, LambdaLocalError> {
    values
        .iter()
        .map(|entry| match entry.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.to_string()))
            }
            _ => Err(LambdaLocalError::InvalidOverride {
                value: entry.clone(),
            }),
        })
        .collect()
}
