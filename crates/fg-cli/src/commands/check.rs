//! Check command - report the matcher verdict for domains

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::Context;

/// Check command arguments
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Domains to check
    #[arg(required = true)]
    pub domains: Vec<String>,
}

/// Execute check command
pub fn execute(args: CheckArgs, ctx: Context) -> Result<()> {
    let sync = ctx.open_sync()?;

    for domain in &args.domains {
        if sync.is_blocked(Some(domain)) {
            println!("{} {}", "BLOCKED".red().bold(), domain);
        } else {
            println!("{} {}", "allowed".green(), domain);
        }
    }

    Ok(())
}
