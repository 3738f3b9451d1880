//! Voxdash - Voice diagnostic dashboard client
//!
#![doc = "Voxdash - Voice diagnostic dashboard client"]
#![doc = "Main entry point for the voxdash command-line tool."]

use anyhow::Result;

use voxdash::cli::Cli;
use voxdash::commands;
use voxdash::config::Config;
use voxdash::logging::{init_logging, with_bootstrap_logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration; warnings go through a temporary subscriber
    let config_path = cli.config.as_deref().unwrap_or("config/voxdash.yaml");
    let config = with_bootstrap_logging(|| Config::load(config_path, &cli))?;

    // Validate configuration
    config.validate()?;

    init_logging(&config.logging)?;

    commands::execute(config, cli.command).await
}
