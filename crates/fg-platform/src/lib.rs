//! FocusGuard Platform Layer
//!
//! Moves raw IP frames between a virtual network interface and the filter
//! engine.
//!
//! ## Tunnels
//!
//! - **Descriptor tunnel** (Unix): a TUN file descriptor opened by the host
//! - **Memory tunnel**: channel-backed frames for tests and embedding

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
pub use error::{PlatformError, Result};

mod traits;
pub use traits::TunnelDevice;

#[cfg(unix)]
mod fd;
#[cfg(unix)]
pub use fd::FdTunnel;

mod memory;
pub use memory::{MemoryTunnel, TunnelPeer};

mod io_loop;
pub use io_loop::{ShutdownHandle, TunnelIoLoop, DEFAULT_ERROR_LIMIT};
