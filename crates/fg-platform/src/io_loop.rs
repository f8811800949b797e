//! The packet loop
//!
//! One dedicated thread reads a frame, asks the engine for a verdict, and
//! writes the frame back unless it was dropped.

use crate::error::{PlatformError, Result};
use crate::traits::TunnelDevice;
use bytes::Bytes;
use fg_core::engine::{FilterDecisionEngine, StatsSnapshot};
use fg_core::packet::MAX_PACKET_SIZE;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

/// Cooperative stop signal for the loop
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    /// Create a handle in the running state
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop after its current read
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested
    pub fn is_shutdown(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Consecutive failed reads or writes tolerated before the loop gives up
pub const DEFAULT_ERROR_LIMIT: u32 = 64;

/// Read/decide/write loop over a tunnel device
///
/// A failed read or write costs one frame: it is logged, counted in
/// [`StatsSnapshot::io_errors`] and the loop moves on. Only a closed tunnel,
/// a shutdown request or an unbroken run of failures ends it.
pub struct TunnelIoLoop<T: TunnelDevice> {
    device: T,
    engine: FilterDecisionEngine,
    shutdown: ShutdownHandle,
    buffer: Vec<u8>,
    error_limit: u32,
}

impl<T: TunnelDevice> TunnelIoLoop<T> {
    /// Create a loop with the default read buffer
    pub fn new(device: T, engine: FilterDecisionEngine) -> Self {
        Self {
            device,
            engine,
            shutdown: ShutdownHandle::new(),
            buffer: vec![0u8; MAX_PACKET_SIZE],
            error_limit: DEFAULT_ERROR_LIMIT,
        }
    }

    /// Set the read buffer size
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer = vec![0u8; size.max(1)];
        self
    }

    /// Set how many reads or writes in a row may fail before the loop stops
    #[must_use]
    pub fn with_error_limit(mut self, limit: u32) -> Self {
        self.error_limit = limit.max(1);
        self
    }

    /// Use an existing shutdown handle
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: ShutdownHandle) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Handle that stops this loop
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Run until shutdown is requested or the tunnel closes
    ///
    /// Returns the engine counters at exit, or the last I/O error if the
    /// tunnel failed more than the error limit allows in a row.
    pub fn run(mut self) -> Result<StatsSnapshot> {
        info!(buffer = self.buffer.len(), "Packet loop started");

        let outcome = self.pump();
        if let Err(e) = self.device.close() {
            warn!("Failed to close tunnel: {}", e);
        }

        let stats = self.engine.stats().snapshot();
        match outcome {
            Ok(()) => {
                info!(
                    packets = stats.packets,
                    dropped = stats.dropped,
                    "Packet loop stopped"
                );
                Ok(stats)
            }
            Err(e) => {
                error!("Packet loop failed: {}", e);
                Err(e)
            }
        }
    }

    /// Run on a dedicated thread
    pub fn spawn(self) -> io::Result<JoinHandle<Result<StatsSnapshot>>>
    where
        T: 'static,
    {
        thread::Builder::new()
            .name("tunnel-io".to_string())
            .spawn(move || self.run())
    }

    fn pump(&mut self) -> Result<()> {
        let mut consecutive_errors = 0u32;

        while !self.shutdown.is_shutdown() {
            let len = match self.device.recv(&mut self.buffer) {
                Ok(Some(len)) if len > 0 => len,
                Ok(_) => continue,
                Err(PlatformError::TunnelClosed) => {
                    info!("Tunnel closed by peer");
                    return Ok(());
                }
                Err(e) => {
                    self.skip_failed("read", e, &mut consecutive_errors)?;
                    continue;
                }
            };

            let verdict = self
                .engine
                .decide(Bytes::copy_from_slice(&self.buffer[..len]));
            trace!(len, decision = ?verdict.decision, "Frame decided");

            if !verdict.decision.is_forwarded() {
                consecutive_errors = 0;
                continue;
            }

            match self.device.send(&verdict.bytes) {
                Ok(()) => consecutive_errors = 0,
                Err(PlatformError::TunnelClosed) => {
                    debug!("Tunnel closed while writing");
                    return Ok(());
                }
                Err(e) => self.skip_failed("write", e, &mut consecutive_errors)?,
            }
        }

        debug!("Shutdown requested");
        Ok(())
    }

    /// Count a failed read or write and carry on, unless failures keep coming
    fn skip_failed(&self, op: &str, err: PlatformError, consecutive: &mut u32) -> Result<()> {
        self.engine.stats().record_io_error();
        *consecutive += 1;

        if *consecutive >= self.error_limit {
            error!(op, consecutive = *consecutive, "Tunnel keeps failing: {}", err);
            return Err(err);
        }

        warn!(op, "Tunnel {} failed, skipping frame: {}", op, err);
        Ok(())
    }
}
