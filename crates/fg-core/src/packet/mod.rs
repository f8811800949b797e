//! Packet header parsing
//!
//! Low-level, bounds-checked reads of the IPv4, UDP and TCP headers of
//! frames delivered by the tunnel. Only the fields the filter needs are
//! decoded; the frame itself is never modified.

mod parser;
mod types;

pub use parser::PacketParser;
pub use types::*;

/// Maximum packet size read from the tunnel
pub const MAX_PACKET_SIZE: usize = 32767;

/// Minimum IPv4 header size (IHL = 5)
pub const IPV4_MIN_HEADER_LEN: usize = 20;

/// UDP header size
pub const UDP_HEADER_LEN: usize = 8;

/// Minimum TCP header size (data offset = 5)
pub const TCP_MIN_HEADER_LEN: usize = 20;
