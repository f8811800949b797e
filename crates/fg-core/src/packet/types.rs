//! Packet type definitions

use crate::error::ParseFault;
use std::net::Ipv4Addr;

/// Transport protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// TCP (protocol number 6)
    Tcp,
    /// UDP (protocol number 17)
    Udp,
    /// ICMP (protocol number 1)
    Icmp,
    /// Any other protocol number
    Other(u8),
}

impl Protocol {
    /// Create from protocol number
    pub fn from_u8(proto: u8) -> Self {
        match proto {
            1 => Protocol::Icmp,
            6 => Protocol::Tcp,
            17 => Protocol::Udp,
            other => Protocol::Other(other),
        }
    }

    /// Get protocol number
    pub fn to_u8(self) -> u8 {
        match self {
            Protocol::Icmp => 1,
            Protocol::Tcp => 6,
            Protocol::Udp => 17,
            Protocol::Other(n) => n,
        }
    }
}

/// Fields read from an IPv4 header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    /// Header length in bytes (IHL x 4); the transport header starts here
    pub header_len: usize,
    /// Transport protocol
    pub protocol: Protocol,
    /// Source address
    pub src_addr: Ipv4Addr,
    /// Destination address
    pub dst_addr: Ipv4Addr,
}

/// Source and destination ports of a UDP or TCP header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ports {
    /// Source port
    pub src: u16,
    /// Destination port
    pub dst: u16,
}

impl Ports {
    /// Check if either side uses the given port
    pub fn either(self, port: u16) -> bool {
        self.src == port || self.dst == port
    }
}

/// What the packet parser decided a frame is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Not an IPv4 UDP/TCP frame the filter understands
    Unsupported(ParseFault),
    /// UDP datagram to or from port 53; DNS message begins at `payload_offset`
    Dns {
        /// IPv4 header fields
        header: Ipv4Header,
        /// UDP ports
        ports: Ports,
        /// Offset of the DNS message within the frame
        payload_offset: usize,
    },
    /// TCP segment to or from port 80/443
    Web {
        /// IPv4 header fields
        header: Ipv4Header,
        /// TCP ports
        ports: Ports,
        /// Offset of the TCP header within the frame
        transport_offset: usize,
    },
    /// Recognized but not inspected
    Passthrough,
}

/// Common well-known ports
pub mod ports {
    /// HTTP port
    pub const HTTP: u16 = 80;
    /// HTTPS port
    pub const HTTPS: u16 = 443;
    /// DNS port
    pub const DNS: u16 = 53;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_from_u8() {
        assert_eq!(Protocol::from_u8(6), Protocol::Tcp);
        assert_eq!(Protocol::from_u8(17), Protocol::Udp);
        assert_eq!(Protocol::from_u8(1), Protocol::Icmp);
        assert_eq!(Protocol::from_u8(58), Protocol::Other(58));
        assert_eq!(Protocol::from_u8(0), Protocol::Other(0));
    }

    #[test]
    fn test_protocol_to_u8() {
        for n in [1u8, 6, 17, 41, 255] {
            assert_eq!(Protocol::from_u8(n).to_u8(), n);
        }
    }

    #[test]
    fn test_ports_either() {
        let p = Ports { src: 53, dst: 40000 };
        assert!(p.either(53));
        assert!(p.either(40000));
        assert!(!p.either(443));
    }

    #[test]
    fn test_well_known_ports() {
        assert_eq!(ports::HTTP, 80);
        assert_eq!(ports::HTTPS, 443);
        assert_eq!(ports::DNS, 53);
    }
}
