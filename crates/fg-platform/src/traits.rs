//! Platform-agnostic tunnel interface
//!
//! Implemented by every source of raw IP frames the filter can sit on.

use crate::Result;

/// A packet-oriented virtual network interface
///
/// Every successful read yields exactly one IP frame.
pub trait TunnelDevice: Send {
    /// Receive one frame into `buf`
    ///
    /// Returns `Ok(Some(len))` for a frame, `Ok(None)` when the read timed out
    /// or was interrupted with nothing to deliver, and
    /// [`PlatformError::TunnelClosed`](crate::PlatformError::TunnelClosed) once
    /// the tunnel has reached end-of-stream. Frames longer than `buf` are
    /// truncated.
    fn recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>>;

    /// Write one frame back to the interface
    fn send(&mut self, frame: &[u8]) -> Result<()>;

    /// Release the device
    fn close(&mut self) -> Result<()>;
}
