//! FocusGuard CLI
//!
//! Command-line interface for the DNS-level domain blocker.

mod args;
mod commands;
mod logging;
mod paths;

use anyhow::{Context, Result};
use clap::Parser;
use fg_core::Config;
use tracing::error;

use args::Args;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let config = load_config(&args)?;

    // Initialize logging
    let _log_guard = logging::init(&args, &config)?;

    let result = run(args, config);

    if let Err(ref e) = result {
        error!("Fatal error: {:#}", e);
    }

    result
}

fn run(args: Args, config: Config) -> Result<()> {
    let ctx = commands::Context {
        config,
        config_path: args.config.unwrap_or_else(paths::default_config_path),
        store_override: args.store,
    };

    match args.command {
        commands::Command::Run(run_args) => commands::run::execute(run_args, ctx),
        commands::Command::Domains(domains_args) => commands::domains::execute(domains_args, ctx),
        commands::Command::Check(check_args) => commands::check::execute(check_args, ctx),
        commands::Command::Config(config_args) => commands::config::execute(config_args, ctx),
        commands::Command::Completions(comp_args) => commands::completions::execute(comp_args),
    }
}

/// Explicit `--config` must exist; the default location is optional
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref path) = args.config {
        return Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let path = paths::default_config_path();
    if path.exists() {
        Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))
    } else {
        Ok(Config::default())
    }
}
