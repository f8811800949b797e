//! Domains command - blocklist management

use anyhow::{bail, Context as _, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use fg_core::store::category;
use fg_core::BlockedDomainRecord;
use tracing::info;

use super::Context;

/// Domains command arguments
#[derive(Args, Debug)]
pub struct DomainsArgs {
    #[command(subcommand)]
    pub action: DomainsAction,
}

/// Domains subcommands
#[derive(Subcommand, Debug)]
pub enum DomainsAction {
    /// List blocked patterns
    List {
        /// Only show one category
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Block one or more patterns (`example.com` or `*.example.com`)
    Add {
        /// Patterns to block
        #[arg(required = true)]
        domains: Vec<String>,

        /// Category to file them under
        #[arg(short = 'C', long, default_value = category::CUSTOM)]
        category: String,
    },

    /// Unblock one or more patterns
    Remove {
        /// Patterns to unblock
        #[arg(required = true)]
        domains: Vec<String>,
    },

    /// Unblock every pattern of a category
    RemoveCategory {
        /// Category name
        category: String,
    },

    /// Unblock everything
    Clear {
        /// Confirm removal of every pattern
        #[arg(long)]
        yes: bool,
    },

    /// Show the number of blocked patterns
    Count,
}

/// Execute domains command
pub fn execute(args: DomainsArgs, ctx: Context) -> Result<()> {
    let sync = ctx.open_sync()?;

    match args.action {
        DomainsAction::List { category, json } => {
            let mut records = match category {
                Some(ref c) => sync.store().list_by_category(c)?,
                None => sync.store().load_all()?,
            };
            records.sort_by(|a, b| (&a.category, &a.domain).cmp(&(&b.category, &b.domain)));

            if json {
                let out = serde_json::to_string_pretty(&records).context("Failed to serialize records")?;
                println!("{out}");
            } else {
                print_records(&records);
            }
        }
        DomainsAction::Add { domains, category } => {
            for domain in &domains {
                let record = sync
                    .add_domain(domain, &category)
                    .with_context(|| format!("Failed to add {domain}"))?;
                println!("{} {} ({})", "+".green().bold(), record.domain, record.category);
            }
        }
        DomainsAction::Remove { domains } => {
            for domain in &domains {
                if sync.remove_domain(domain)? {
                    println!("{} {}", "-".red().bold(), domain);
                } else {
                    println!("{} {} (not in blocklist)", "?".yellow(), domain);
                }
            }
        }
        DomainsAction::RemoveCategory { category } => {
            let removed = sync.remove_category(&category)?;
            println!("Removed {removed} pattern(s) from category '{category}'");
        }
        DomainsAction::Clear { yes } => {
            if !yes {
                bail!("Refusing to clear the blocklist without --yes");
            }
            sync.clear_all()?;
            info!(path = %ctx.store_path().display(), "Blocklist cleared");
            println!("Blocklist cleared");
        }
        DomainsAction::Count => {
            println!("{}", sync.store().count()?);
        }
    }

    Ok(())
}

fn print_records(records: &[BlockedDomainRecord]) {
    if records.is_empty() {
        println!("{}", "Blocklist is empty".dimmed());
        return;
    }

    let mut current: Option<&str> = None;
    for record in records {
        if current != Some(record.category.as_str()) {
            println!("{}", format!("[{}]", record.category).cyan().bold());
            current = Some(&record.category);
        }
        let marker = if record.is_wildcard { "*" } else { " " };
        println!("  {} {}", marker.yellow(), record.domain);
    }
}
