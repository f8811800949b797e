//! CLI commands

pub mod check;
pub mod completions;
pub mod config;
pub mod domains;
pub mod run;

use anyhow::{Context as _, Result};
use clap::Subcommand;
use fg_core::{BlocklistSync, Config, FileStore, SharedMatcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::paths;

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Filter a TUN interface (main command)
    Run(run::RunArgs),

    /// Manage the blocklist
    Domains(domains::DomainsArgs),

    /// Check whether domains are blocked
    Check(check::CheckArgs),

    /// Configuration management
    Config(config::ConfigArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// State shared by every command
#[derive(Debug)]
pub struct Context {
    /// Effective configuration
    pub config: Config,
    /// Configuration file in effect (may not exist)
    pub config_path: PathBuf,
    /// `--store` override
    pub store_override: Option<PathBuf>,
}

impl Context {
    /// Blocklist file in effect
    pub fn store_path(&self) -> PathBuf {
        paths::store_path(self.store_override.as_deref(), self.config.store.path.as_deref())
    }

    /// Open the blocklist store and load it into a fresh matcher
    pub fn open_sync(&self) -> Result<BlocklistSync> {
        let sync = open_store(&self.store_path(), self.config.store.seed_defaults, SharedMatcher::new())?;
        sync.initialize().context("Failed to load blocklist")?;
        Ok(sync)
    }
}

/// Open the blocklist file and attach it to `matcher` without loading anything
pub fn open_store(path: &Path, seed_defaults: bool, matcher: SharedMatcher) -> Result<BlocklistSync> {
    let store = FileStore::open(path)
        .with_context(|| format!("Failed to open blocklist {}", path.display()))?;

    Ok(BlocklistSync::new(Arc::new(store), matcher).with_seed_defaults(seed_defaults))
}
