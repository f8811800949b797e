//! Channel-backed tunnel
//!
//! Frames injected through a [`TunnelPeer`] are read by the loop; frames the
//! loop writes come back out of the peer. Used by tests and by hosts that
//! deliver frames in-process.

use crate::error::{PlatformError, Result};
use crate::traits::TunnelDevice;
use bytes::Bytes;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;
use tracing::debug;

/// In-process tunnel
#[derive(Debug)]
pub struct MemoryTunnel {
    inbound: Receiver<Bytes>,
    outbound: Option<Sender<Bytes>>,
    poll_interval: Duration,
}

/// Host side of a [`MemoryTunnel`]
///
/// Dropping the peer closes the tunnel once the frames already injected
/// have been read.
#[derive(Debug)]
pub struct TunnelPeer {
    inject: Sender<Bytes>,
    output: Receiver<Bytes>,
}

impl MemoryTunnel {
    /// Default receive timeout
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

    /// Create a connected tunnel and peer
    pub fn pair() -> (Self, TunnelPeer) {
        Self::with_poll_interval(Self::DEFAULT_POLL_INTERVAL)
    }

    /// Create a connected pair with a custom receive timeout
    pub fn with_poll_interval(poll_interval: Duration) -> (Self, TunnelPeer) {
        let (inject, inbound) = mpsc::channel();
        let (outbound, output) = mpsc::channel();

        let tunnel = Self {
            inbound,
            outbound: Some(outbound),
            poll_interval,
        };
        (tunnel, TunnelPeer { inject, output })
    }
}

impl TunnelDevice for MemoryTunnel {
    fn recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        match self.inbound.recv_timeout(self.poll_interval) {
            Ok(frame) => {
                let len = frame.len().min(buf.len());
                buf[..len].copy_from_slice(&frame[..len]);
                Ok(Some(len))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(PlatformError::TunnelClosed),
        }
    }

    fn send(&mut self, frame: &[u8]) -> Result<()> {
        let outbound = self.outbound.as_ref().ok_or(PlatformError::TunnelClosed)?;
        outbound
            .send(Bytes::copy_from_slice(frame))
            .map_err(|_| PlatformError::TunnelClosed)
    }

    fn close(&mut self) -> Result<()> {
        if self.outbound.take().is_some() {
            debug!("Memory tunnel closed");
        }
        Ok(())
    }
}

impl TunnelPeer {
    /// Hand a frame to the tunnel; returns `false` if the tunnel is gone
    pub fn inject(&self, frame: impl Into<Bytes>) -> bool {
        self.inject.send(frame.into()).is_ok()
    }

    /// Wait for the next frame written by the loop
    pub fn recv_output(&self, timeout: Duration) -> Option<Bytes> {
        self.output.recv_timeout(timeout).ok()
    }

    /// Collect every frame already written, without waiting
    pub fn drain_output(&self) -> Vec<Bytes> {
        self.output.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_flow_both_ways() {
        let (mut tunnel, peer) = MemoryTunnel::pair();
        assert!(peer.inject(vec![1u8, 2, 3]));

        let mut buf = [0u8; 16];
        assert_eq!(tunnel.recv(&mut buf).unwrap(), Some(3));
        tunnel.send(&buf[..3]).unwrap();

        assert_eq!(peer.recv_output(Duration::from_secs(1)).unwrap(), Bytes::from_static(&[1, 2, 3]));
    }

    #[test]
    fn test_timeout_returns_none() {
        let (mut tunnel, _peer) = MemoryTunnel::with_poll_interval(Duration::from_millis(5));
        let mut buf = [0u8; 16];
        assert_eq!(tunnel.recv(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_dropped_peer_closes_after_pending_frames() {
        let (mut tunnel, peer) = MemoryTunnel::pair();
        peer.inject(Bytes::from_static(&[9]));
        drop(peer);

        let mut buf = [0u8; 16];
        assert_eq!(tunnel.recv(&mut buf).unwrap(), Some(1));
        assert!(matches!(tunnel.recv(&mut buf), Err(PlatformError::TunnelClosed)));
        assert!(matches!(tunnel.send(&[1]), Err(PlatformError::TunnelClosed)));
    }

    #[test]
    fn test_oversized_frame_truncated() {
        let (mut tunnel, peer) = MemoryTunnel::pair();
        peer.inject(vec![7u8; 32]);

        let mut buf = [0u8; 8];
        assert_eq!(tunnel.recv(&mut buf).unwrap(), Some(8));
    }
}
