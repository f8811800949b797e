//! Config command - configuration management

use anyhow::{bail, Context as _, Result};
use clap::{Args, Subcommand};
use fg_core::Config;
use std::path::PathBuf;
use tracing::info;

use super::Context;
use crate::paths;

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Output file path (default: per-user config location)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Config file to validate
        file: PathBuf,
    },

    /// Show config and blocklist file locations
    Path,
}

/// Execute config command
pub fn execute(args: ConfigArgs, ctx: Context) -> Result<()> {
    match args.action {
        ConfigAction::Show => show_config(&ctx.config),
        ConfigAction::Init { output, force } => init_config(output, force),
        ConfigAction::Validate { file } => validate_config(file),
        ConfigAction::Path => show_paths(&ctx),
    }
}

fn show_config(config: &Config) -> Result<()> {
    let toml_str = config.to_toml().context("Failed to serialize config")?;
    println!("{toml_str}");
    Ok(())
}

fn init_config(output: Option<PathBuf>, force: bool) -> Result<()> {
    let output = output.unwrap_or_else(paths::default_config_path);
    if output.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", output.display());
    }

    let toml_str = Config::default()
        .to_toml()
        .context("Failed to serialize config")?;

    let content = format!(
        "# FocusGuard configuration\n\
         # Every key is optional; missing keys use the values shown here.\n\n\
         {toml_str}"
    );

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&output, content)
        .with_context(|| format!("Failed to write config to {}", output.display()))?;

    info!(path = %output.display(), "Generated config file");
    println!("Configuration file generated: {}", output.display());

    Ok(())
}

fn validate_config(file: PathBuf) -> Result<()> {
    let config = Config::load(&file)
        .with_context(|| format!("Failed to load config from {}", file.display()))?;

    config.validate().context("Configuration validation failed")?;

    println!("✓ Configuration is valid");
    println!("  Log level: {}", config.logging.level);
    println!("  Seed defaults: {}", config.store.seed_defaults);
    println!("  Reload interval: {}s", config.sync.reload_interval_secs);

    Ok(())
}

fn show_paths(ctx: &Context) -> Result<()> {
    println!("config:    {}", ctx.config_path.display());
    println!("blocklist: {}", ctx.store_path().display());
    Ok(())
}
