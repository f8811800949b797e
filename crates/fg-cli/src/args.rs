//! Command-line argument parsing

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::commands::Command;

/// FocusGuard - DNS-level domain blocker
///
/// Filters DNS queries on a TUN interface and drops the ones asking for
/// blocked domains.
#[derive(Parser, Debug)]
#[command(name = "focusguard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", env = "FOCUSGUARD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Blocklist file path (overrides the configuration)
    #[arg(short = 's', long, value_name = "FILE", env = "FOCUSGUARD_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format for logs
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Log file path
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// Compact format
    Compact,
}

impl From<fg_core::config::LogFormat> for LogFormat {
    fn from(format: fg_core::config::LogFormat) -> Self {
        match format {
            fg_core::config::LogFormat::Text => LogFormat::Text,
            fg_core::config::LogFormat::Json => LogFormat::Json,
            fg_core::config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}
