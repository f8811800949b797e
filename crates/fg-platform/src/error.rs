//! Platform-specific errors

use thiserror::Error;

/// Platform-specific errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The tunnel reached end-of-stream or its peer went away
    #[error("Tunnel closed")]
    TunnelClosed,

    /// Descriptor handed over by the host is unusable
    #[error("Invalid tunnel descriptor: {0}")]
    InvalidDescriptor(String),

    /// Tunnel devices are not available on this platform
    #[error("Unsupported platform: {0}")]
    Unsupported(String),

    /// The device accepted only part of a frame
    #[error("Short write to tunnel: {written} of {len} bytes")]
    ShortWrite {
        /// Bytes accepted
        written: usize,
        /// Frame length
        len: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Platform result type
pub type Result<T> = std::result::Result<T, PlatformError>;
