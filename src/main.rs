//! lambda-local CLI entry point
//!
//! Parses arguments, runs the extraction, and turns any failure into a
//! user-friendly message with a suggestion before exiting non-zero.

use anyhow::Result;
use clap::Parser;
use lambda_local::cli;
use lambda_local::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
