//! Tunnel over a host-provided file descriptor
//!
//! The host (a VPN service, `ip tuntap`, a test harness) opens and configures
//! the TUN interface and passes the descriptor in. Each `read` on a TUN
//! descriptor returns one IP frame and each `write` injects one.

use crate::error::{PlatformError, Result};
use crate::traits::TunnelDevice;
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::os::fd::{AsRawFd, OwnedFd};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Tunnel backed by a TUN file descriptor
///
/// A blocking descriptor only wakes the loop when a frame arrives or the
/// host closes the interface, so shutdown takes effect at the next frame.
#[derive(Debug)]
pub struct FdTunnel {
    file: Option<File>,
    poll_interval: Duration,
}

impl FdTunnel {
    /// Default wait between reads on a non-blocking descriptor
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

    /// Wrap an owned descriptor
    pub fn new(fd: OwnedFd) -> Self {
        Self::from_file(File::from(fd))
    }

    /// Wrap an already opened file
    pub fn from_file(file: File) -> Self {
        info!(fd = file.as_raw_fd(), "Tunnel descriptor attached");
        Self {
            file: Some(file),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set how long to wait when a non-blocking read has nothing ready
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn file(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or(PlatformError::TunnelClosed)
    }
}

impl TunnelDevice for FdTunnel {
    fn recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        let poll_interval = self.poll_interval;
        match self.file()?.read(buf) {
            Ok(0) => Err(PlatformError::TunnelClosed),
            Ok(n) => Ok(Some(n)),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(None),
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                thread::sleep(poll_interval);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn send(&mut self, frame: &[u8]) -> Result<()> {
        let written = self.file()?.write(frame)?;
        if written != frame.len() {
            return Err(PlatformError::ShortWrite {
                written,
                len: frame.len(),
            });
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            debug!(fd = file.as_raw_fd(), "Closing tunnel descriptor");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, SeekFrom};

    #[test]
    fn test_send_then_read_back() {
        let mut file = tempfile::tempfile().unwrap();
        let mut tunnel = FdTunnel::from_file(file.try_clone().unwrap());

        tunnel.send(&[0x45, 0x00, 0x00, 0x14]).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();

        // Cloned handles share the file offset.
        let mut buf = [0u8; 64];
        assert_eq!(tunnel.recv(&mut buf).unwrap(), Some(4));
        assert_eq!(&buf[..4], &[0x45, 0x00, 0x00, 0x14]);
    }

    #[test]
    fn test_eof_is_closed() {
        let file = tempfile::tempfile().unwrap();
        let mut tunnel = FdTunnel::from_file(file);

        let mut buf = [0u8; 64];
        assert!(matches!(tunnel.recv(&mut buf), Err(PlatformError::TunnelClosed)));
    }

    #[test]
    fn test_closed_tunnel_rejects_io() {
        let file = tempfile::tempfile().unwrap();
        let mut tunnel = FdTunnel::from_file(file);
        tunnel.close().unwrap();
        tunnel.close().unwrap();

        assert!(matches!(tunnel.send(&[1, 2, 3]), Err(PlatformError::TunnelClosed)));
        let mut buf = [0u8; 8];
        assert!(matches!(tunnel.recv(&mut buf), Err(PlatformError::TunnelClosed)));
    }
}
