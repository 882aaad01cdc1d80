//! Helpers shared by the test suites.

#![allow(dead_code)]

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tokio::fs;

/// An isolated directory holding templates and a configuration file.
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
    home_dir: PathBuf,
}

impl TestProject {
    /// Create an empty project with its own home directory.
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let home_dir = temp_dir.path().join("home");

        fs::create_dir_all(&project_dir).await?;
        fs::create_dir_all(&home_dir).await?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
            home_dir,
        })
    }

    /// Get the project directory path
    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    /// Write `template.yaml` (or another name) into the project directory.
    pub async fn write_template(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.project_dir.join(name);
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write template to {}", path.display()))?;
        Ok(path)
    }

    /// Write `~/.lambda-local/config.toml` inside the isolated home directory.
    pub async fn write_config(&self, content: &str) -> Result<PathBuf> {
        let dir = self.home_dir.join(".lambda-local");
        fs::create_dir_all(&dir).await?;
        let path = dir.join("config.toml");
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(path)
    }

    /// Run the binary in the project directory with a clean environment.
    pub fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        self.run_with_env(args, &[])
    }

    /// Like [`TestProject::run`], with extra environment variables set.
    pub fn run_with_env(&self, args: &[&str], vars: &[(&str, &str)]) -> Result<CommandOutput> {
        let binary = env!("CARGO_BIN_EXE_lambda-local");
        let output = Command::new(binary)
            .args(args)
            .current_dir(&self.project_dir)
            .env("HOME", &self.home_dir)
            .env("USERPROFILE", &self.home_dir)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("LAMBDA_LOCAL_PROFILE")
            .env_remove("LAMBDA_LOCAL_TEMPLATE")
            .env_remove("LAMBDA_LOCAL_CONFIG")
            .envs(vars.iter().copied())
            .output()
            .context("Failed to run lambda-local")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Command output helper
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStderr: {}",
            self.code, self.stderr
        );
        self
    }

    /// Assert stdout contains the given text
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}
