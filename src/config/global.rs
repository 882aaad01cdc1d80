//! User configuration file (`~/.lambda-local/config.toml`).
//!
//! The file supplies values for things a template cannot know on its own:
//! pseudo-parameters (`AWS::Region`, `AWS::AccountId`, `AWS::StackName`) and
//! parameter overrides. Values can be set once under `[defaults]` and per
//! named profile under `[profiles.<name>]`:
//!
//! ```toml
//! [defaults]
//! region = "eu-west-1"
//!
//! [profiles.staging]
//! account_id = "111111111111"
//! stack_name = "orders-staging"
//!
//! [profiles.staging.parameters]
//! Env = "staging"
//! ```
//!
//! Precedence, highest first: command-line flags, the selected profile,
//! `[defaults]`, built-in defaults. A missing file is not an error.
//!
//! The location can be overridden with `--config` or the
//! `LAMBDA_LOCAL_CONFIG` environment variable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::constants::DEFAULT_PROFILE;
use crate::core::LambdaLocalError;
use crate::intrinsics::{ContextOverrides, PseudoParameters};

/// Settings that can appear under `[defaults]` or a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSettings {
    /// Value for `AWS::Region`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Value for `AWS::AccountId`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    /// Value for `AWS::StackName`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_name: Option<String>,

    /// Template parameter overrides
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl ProfileSettings {
    /// Layer `self` over `base`: values set here win.
    #[must_use]
    pub fn over(&self, base: &Self) -> Self {
        let mut parameters = base.parameters.clone();
        parameters.extend(self.parameters.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            region: self.region.clone().or_else(|| base.region.clone()),
            account_id: self.account_id.clone().or_else(|| base.account_id.clone()),
            stack_name: self.stack_name.clone().or_else(|| base.stack_name.clone()),
            parameters,
        }
    }

    /// Turn settings into resolver overrides, filling gaps with built-in defaults.
    #[must_use]
    pub fn into_overrides(self) -> ContextOverrides {
        let builtin = PseudoParameters::default();
        ContextOverrides {
            parameters: self.parameters,
            pseudo: PseudoParameters {
                region: self.region.unwrap_or(builtin.region),
                account_id: self.account_id.unwrap_or(builtin.account_id),
                stack_name: self.stack_name.unwrap_or(builtin.stack_name),
            },
        }
    }
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Settings applied to every profile
    #[serde(default)]
    pub defaults: ProfileSettings,

    /// Named profiles
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, ProfileSettings>,
}

impl GlobalConfig {
    /// Load from `path` if given, else the default location. A missing file
    /// yields defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if fs::try_exists(&path).await.unwrap_or(false) {
            Self::load_from(&path).await
        } else {
            debug!("No configuration file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid TOML for this schema.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content).map_err(|e| {
            LambdaLocalError::ConfigParseError {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// `~/.lambda-local/config.toml`.
    ///
    /// # Errors
    ///
    /// Fails if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
            .join(".lambda-local");
        Ok(config_dir.join("config.toml"))
    }

    /// Effective settings for `profile`: the profile layered over `[defaults]`.
    ///
    /// The default profile may be absent from the file; any other name must
    /// be declared.
    ///
    /// # Errors
    ///
    /// Returns [`LambdaLocalError::ProfileNotFound`] for an undeclared,
    /// non-default profile.
    pub fn profile(&self, name: &str) -> Result<ProfileSettings, LambdaLocalError> {
        match self.profiles.get(name) {
            Some(settings) => Ok(settings.over(&self.defaults)),
            None if name == DEFAULT_PROFILE => Ok(self.defaults.clone()),
            None => Err(LambdaLocalError::ProfileNotFound {
                name: name.to_string(),
                available: self.profiles.keys().cloned().collect(),
            }),
        }
    }
}
