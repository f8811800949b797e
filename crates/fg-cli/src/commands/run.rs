//! Run command - filter a TUN interface

use anyhow::{Context as _, Result};
use clap::Args;
use fg_core::{BlocklistSync, Config, FilterDecisionEngine, SharedMatcher};
use fg_platform::{ShutdownHandle, TunnelDevice, TunnelIoLoop};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{open_store, Context};

/// Run command arguments
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Descriptor of an opened TUN interface, inherited from the parent process
    #[arg(long, value_name = "FD", env = "FOCUSGUARD_TUN_FD", required_unless_present = "dry_run")]
    pub tun_fd: Option<i32>,

    /// Read buffer size in bytes (overrides the configuration)
    #[arg(long, value_name = "BYTES")]
    pub buffer_size: Option<usize>,

    /// Never seed the built-in categories into an empty blocklist
    #[arg(long)]
    pub no_seed: bool,

    /// Validate the setup and load the blocklist, then exit
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the run command
pub fn execute(args: RunArgs, mut ctx: Context) -> Result<()> {
    print_banner();

    if let Some(size) = args.buffer_size {
        ctx.config.tunnel.buffer_size = size;
    }
    if args.no_seed {
        ctx.config.store.seed_defaults = false;
    }
    ctx.config.validate().context("Invalid configuration")?;

    let store_path = ctx.store_path();
    info!(
        name = %ctx.config.general.name,
        store = %store_path.display(),
        buffer = ctx.config.tunnel.buffer_size,
        "Starting FocusGuard"
    );

    if args.dry_run {
        let sync = ctx.open_sync()?;
        info!(patterns = sync.matcher().count(), "Dry run complete");
        return Ok(());
    }

    let matcher = SharedMatcher::new();
    let engine = FilterDecisionEngine::new(matcher.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("focusguard-sync")
        .build()
        .context("Failed to start async runtime")?;

    let fd = args.tun_fd.context("--tun-fd is required")?;
    let device = open_tunnel(fd, &ctx.config)?;
    let shutdown = ShutdownHandle::new();

    let handler_shutdown = shutdown.clone();
    ctrlc::set_handler(move || {
        info!("Received interrupt signal, shutting down...");
        handler_shutdown.shutdown();
    })
    .context("Failed to set signal handler")?;

    // The loop starts with an empty matcher and forwards everything until
    // the blocklist has been loaded.
    let loop_handle = TunnelIoLoop::new(device, engine.clone())
        .with_buffer_size(ctx.config.tunnel.buffer_size)
        .with_shutdown(shutdown.clone())
        .spawn()
        .context("Failed to start packet loop")?;

    let source = BlocklistSource {
        path: store_path,
        seed_defaults: ctx.config.store.seed_defaults,
        matcher,
    };

    let summary = runtime.block_on(async {
        let sync = spawn_sync(source, ctx.config.sync.reload_interval_secs);
        let report = spawn_stats_report(engine, ctx.config.general.stats_interval_secs);

        let joined = tokio::task::spawn_blocking(move || loop_handle.join()).await;

        sync.abort();
        report.abort();
        joined
    });

    shutdown.shutdown();

    let stats = summary
        .context("Packet loop task failed")?
        .map_err(|_| anyhow::anyhow!("Packet loop panicked"))?
        .context("Packet loop failed")?;

    info!(
        packets = stats.packets,
        forwarded = stats.forwarded,
        dropped = stats.dropped,
        unsupported = stats.unsupported,
        faults = stats.faults,
        io_errors = stats.io_errors,
        "FocusGuard stopped"
    );

    Ok(())
}

/// Where the running filter gets its blocklist from
#[derive(Clone)]
struct BlocklistSource {
    path: PathBuf,
    seed_defaults: bool,
    matcher: SharedMatcher,
}

impl BlocklistSource {
    /// Open and load the store; failures are logged and leave the filter open
    async fn connect(&self) -> Option<BlocklistSync> {
        let source = self.clone();
        let loaded = tokio::task::spawn_blocking(move || -> Result<(BlocklistSync, usize)> {
            let sync = open_store(&source.path, source.seed_defaults, source.matcher)?;
            let count = sync.initialize().context("Failed to load blocklist")?;
            Ok((sync, count))
        })
        .await;

        match loaded {
            Ok(Ok((sync, count))) => {
                info!(patterns = count, "Blocklist active");
                Some(sync)
            }
            Ok(Err(e)) => {
                warn!("Blocklist unavailable, nothing will be blocked: {:#}", e);
                None
            }
            Err(e) => {
                warn!("Blocklist load task failed: {}", e);
                None
            }
        }
    }
}

/// Load the blocklist, then keep it fresh
///
/// Until a load succeeds every tick retries opening the store; after that
/// every tick reloads it.
fn spawn_sync(source: BlocklistSource, interval_secs: u64) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut sync = source.connect().await;
        if interval_secs == 0 {
            return;
        }

        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(current) = sync.clone() else {
                sync = source.connect().await;
                continue;
            };

            match tokio::task::spawn_blocking(move || current.reload()).await {
                Ok(Ok(count)) => debug!(patterns = count, "Blocklist reloaded"),
                Ok(Err(e)) => warn!("Blocklist reload failed, keeping previous: {:#}", e),
                Err(e) => warn!("Blocklist reload task failed: {}", e),
            }
        }
    })
}

fn spawn_stats_report(engine: FilterDecisionEngine, interval_secs: u64) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if interval_secs == 0 {
            return;
        }

        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let stats = engine.stats().snapshot();
            info!(
                packets = stats.packets,
                dropped = stats.dropped,
                dns_queries = stats.dns_queries,
                faults = stats.faults,
                io_errors = stats.io_errors,
                "Filter statistics"
            );
        }
    })
}

#[cfg(unix)]
fn open_tunnel(fd: i32, config: &Config) -> Result<impl TunnelDevice + 'static> {
    use fg_platform::{FdTunnel, PlatformError};
    use std::os::fd::{FromRawFd, OwnedFd};

    if fd < 0 {
        return Err(PlatformError::InvalidDescriptor(format!("{fd} is not a descriptor")).into());
    }

    // SAFETY: the descriptor is inherited from the parent process for our
    // exclusive use; nothing else in this process owns or closes it.
    let owned = unsafe { OwnedFd::from_raw_fd(fd) };

    Ok(FdTunnel::new(owned).with_poll_interval(Duration::from_millis(config.tunnel.poll_interval_ms)))
}

#[cfg(not(unix))]
fn open_tunnel(_fd: i32, _config: &Config) -> Result<fg_platform::MemoryTunnel> {
    Err(fg_platform::PlatformError::Unsupported(
        "TUN descriptors are only supported on Unix".into(),
    )
    .into())
}

fn print_banner() {
    use colored::Colorize;

    eprintln!();
    eprintln!("{}", "╔═══════════════════════════════════════╗".cyan());
    eprintln!(
        "{}{}{}",
        "║  ".cyan(),
        format!("FocusGuard v{:<26}", env!("CARGO_PKG_VERSION")).green().bold(),
        "║".cyan()
    );
    eprintln!(
        "{}{}{}",
        "║  ".cyan(),
        "DNS-level domain blocker             ".white(),
        "║".cyan()
    );
    eprintln!("{}", "╚═══════════════════════════════════════╝".cyan());
    eprintln!();
}
