//! IPv4 / UDP / TCP header classification

use super::types::{ports, Classification, Ipv4Header, Ports, Protocol};
use super::{IPV4_MIN_HEADER_LEN, TCP_MIN_HEADER_LEN, UDP_HEADER_LEN};
use crate::error::ParseFault;
use std::net::Ipv4Addr;

/// Header parser for frames read from the tunnel
///
/// All reads are bounds-checked; a frame that is too short for the header
/// being read is reported as a [`ParseFault`] or classified as passthrough,
/// never indexed out of range.
pub struct PacketParser;

impl PacketParser {
    /// Parse the fixed part of an IPv4 header
    pub fn parse_ipv4(data: &[u8]) -> Result<Ipv4Header, ParseFault> {
        if data.len() < IPV4_MIN_HEADER_LEN {
            return Err(ParseFault::TooShort {
                expected: IPV4_MIN_HEADER_LEN,
                actual: data.len(),
            });
        }

        let version = data[0] >> 4;
        if version != 4 {
            return Err(ParseFault::UnsupportedVersion(version));
        }

        let header_len = usize::from(data[0] & 0x0F) * 4;
        if header_len < IPV4_MIN_HEADER_LEN || header_len > data.len() {
            return Err(ParseFault::TooShort {
                expected: header_len.max(IPV4_MIN_HEADER_LEN),
                actual: data.len(),
            });
        }

        Ok(Ipv4Header {
            header_len,
            protocol: Protocol::from_u8(data[9]),
            src_addr: Ipv4Addr::new(data[12], data[13], data[14], data[15]),
            dst_addr: Ipv4Addr::new(data[16], data[17], data[18], data[19]),
        })
    }

    /// Read source and destination ports at `offset`
    ///
    /// Returns `None` unless at least `min_len` bytes remain from `offset`.
    pub fn read_ports(data: &[u8], offset: usize, min_len: usize) -> Option<Ports> {
        let transport = data.get(offset..)?;
        if transport.len() < min_len {
            return None;
        }

        Some(Ports {
            src: u16::from_be_bytes([transport[0], transport[1]]),
            dst: u16::from_be_bytes([transport[2], transport[3]]),
        })
    }

    /// Classify a frame
    pub fn classify(data: &[u8]) -> Classification {
        let header = match Self::parse_ipv4(data) {
            Ok(header) => header,
            Err(fault) => return Classification::Unsupported(fault),
        };

        match header.protocol {
            Protocol::Udp => Self::classify_udp(data, header),
            Protocol::Tcp => Self::classify_tcp(data, header),
            other => Classification::Unsupported(ParseFault::UnsupportedProtocol(other.to_u8())),
        }
    }

    fn classify_udp(data: &[u8], header: Ipv4Header) -> Classification {
        let offset = header.header_len;
        let Some(ports) = Self::read_ports(data, offset, UDP_HEADER_LEN) else {
            return Classification::Passthrough;
        };

        if ports.either(ports::DNS) {
            Classification::Dns {
                header,
                ports,
                payload_offset: offset + UDP_HEADER_LEN,
            }
        } else {
            Classification::Passthrough
        }
    }

    fn classify_tcp(data: &[u8], header: Ipv4Header) -> Classification {
        let offset = header.header_len;
        let Some(ports) = Self::read_ports(data, offset, TCP_MIN_HEADER_LEN) else {
            return Classification::Passthrough;
        };

        if ports.either(ports::HTTP) || ports.either(ports::HTTPS) {
            Classification::Web {
                header,
                ports,
                transport_offset: offset,
            }
        } else {
            Classification::Passthrough
        }
    }
}
