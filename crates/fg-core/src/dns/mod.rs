//! DNS message parsing
//!
//! Reads the 12-byte DNS header and the name of the first question. Names
//! are read literally as length-prefixed labels: compression pointers are
//! not followed, which is sufficient for outgoing queries.
//!
//! Nothing here returns an error to the filter. Malformed input produces a
//! query without a domain, which the engine forwards.

use crate::error::ParseFault;
use bitflags::bitflags;
use tracing::trace;

/// DNS header size
pub const DNS_HEADER_LEN: usize = 12;

/// Longest label allowed by RFC 1035
pub const MAX_LABEL_LEN: u8 = 63;

bitflags! {
    /// Flag bits of the DNS header's second 16-bit word
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DnsFlags: u16 {
        /// Message is a response
        const QR = 0x8000;
        /// Authoritative answer
        const AA = 0x0400;
        /// Truncated
        const TC = 0x0200;
        /// Recursion desired
        const RD = 0x0100;
        /// Recursion available
        const RA = 0x0080;
    }
}

/// Result of parsing a DNS message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDnsQuery {
    /// Transaction ID
    pub transaction_id: u16,
    /// QR bit clear
    pub is_query: bool,
    /// QDCOUNT
    pub question_count: u16,
    /// Name of the first question, if one could be read
    pub domain: Option<String>,
}

/// Parser for DNS messages carried in UDP payloads
pub struct DnsMessageParser;

impl DnsMessageParser {
    /// Parse a DNS message
    ///
    /// Returns `None` when the payload is shorter than a DNS header. Responses,
    /// messages without questions and malformed names yield `domain: None`.
    pub fn parse(payload: &[u8]) -> Option<ParsedDnsQuery> {
        if payload.len() < DNS_HEADER_LEN {
            trace!(len = payload.len(), "DNS payload shorter than header");
            return None;
        }

        let transaction_id = u16::from_be_bytes([payload[0], payload[1]]);
        let flags = DnsFlags::from_bits_retain(u16::from_be_bytes([payload[2], payload[3]]));
        let question_count = u16::from_be_bytes([payload[4], payload[5]]);
        let is_query = !flags.contains(DnsFlags::QR);

        let mut parsed = ParsedDnsQuery {
            transaction_id,
            is_query,
            question_count,
            domain: None,
        };

        // Blocking decisions are made at query time only.
        if !is_query || question_count == 0 {
            return Some(parsed);
        }

        match Self::read_name(payload, DNS_HEADER_LEN) {
            Ok(name) if !name.is_empty() => parsed.domain = Some(name),
            Ok(_) => trace!(id = transaction_id, "DNS question for the root name"),
            Err(fault) => trace!(
                id = transaction_id,
                %fault,
                bytes = %hex::encode(&payload[DNS_HEADER_LEN..payload.len().min(DNS_HEADER_LEN + 32)]),
                "Unreadable DNS question name"
            ),
        }

        Some(parsed)
    }

    /// Queried domain of a DNS message, if it is a readable query
    pub fn extract_domain(payload: &[u8]) -> Option<String> {
        Self::parse(payload).and_then(|q| q.domain)
    }

    /// Read a sequence of length-prefixed labels starting at `offset`
    ///
    /// Labels are joined with `.`. A zero length byte ends the name; a length
    /// above 63 or running out of buffer is a fault.
    pub fn read_name(payload: &[u8], offset: usize) -> Result<String, ParseFault> {
        let mut name = String::new();
        let mut pos = offset;

        loop {
            let Some(&length) = payload.get(pos) else {
                return Err(ParseFault::Truncated(pos));
            };

            if length == 0 {
                return Ok(name);
            }

            if length > MAX_LABEL_LEN {
                return Err(ParseFault::MalformedLabel {
                    length,
                    offset: pos,
                });
            }

            let start = pos + 1;
            let end = start + usize::from(length);
            let Some(label) = payload.get(start..end) else {
                return Err(ParseFault::Truncated(payload.len()));
            };

            if !name.is_empty() {
                name.push('.');
            }
            name.push_str(&String::from_utf8_lossy(label));
            pos = end;
        }
    }
}
