//! Logging initialization

use anyhow::{Context, Result};
use fg_core::Config;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::args::{Args, LogFormat};

/// Initialize logging from CLI arguments, falling back to the configuration
///
/// Console output goes to stderr so command output on stdout stays clean.
/// The returned guard flushes the log file and must be held until exit.
pub fn init(args: &Args, config: &Config) -> Result<Option<WorkerGuard>> {
    let level = resolve_level(args, &config.logging.level);

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let format = args
        .log_format
        .unwrap_or_else(|| config.logging.format.into());

    let (file_writer, guard) = match args.log_file.as_ref().or(config.logging.file.as_ref()) {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Text => {
            let console = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(args.verbose >= 2)
                .with_thread_ids(args.verbose >= 3)
                .with_file(args.verbose >= 3)
                .with_line_number(args.verbose >= 3);
            let file = file_writer.map(|w| fmt::layer().with_ansi(false).with_writer(w));
            registry.with(console).with(file).try_init()
        }
        LogFormat::Json => {
            let console = fmt::layer().json().with_writer(std::io::stderr);
            let file = file_writer.map(|w| fmt::layer().json().with_writer(w));
            registry.with(console).with(file).try_init()
        }
        LogFormat::Compact => {
            let console = fmt::layer().compact().with_writer(std::io::stderr);
            let file = file_writer.map(|w| fmt::layer().compact().with_ansi(false).with_writer(w));
            registry.with(console).with(file).try_init()
        }
    }
    .context("Failed to initialize logging")?;

    Ok(guard)
}

fn resolve_level(args: &Args, configured: &str) -> Level {
    if args.quiet {
        return Level::ERROR;
    }

    match args.verbose {
        0 => configured.parse().unwrap_or(Level::INFO),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_level_resolution() {
        let args = Args::parse_from(["focusguard", "domains", "count"]);
        assert_eq!(resolve_level(&args, "warn"), Level::WARN);
        assert_eq!(resolve_level(&args, "nonsense"), Level::INFO);

        let args = Args::parse_from(["focusguard", "-vv", "domains", "count"]);
        assert_eq!(resolve_level(&args, "warn"), Level::TRACE);

        let args = Args::parse_from(["focusguard", "-q", "domains", "count"]);
        assert_eq!(resolve_level(&args, "debug"), Level::ERROR);
    }
}
