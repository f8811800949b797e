//! Filter decision engine
//!
//! Combines packet classification, DNS parsing and the shared matcher into a
//! single forward/drop verdict per frame. The engine is fail-open: anything
//! it cannot understand, and any panic raised while looking at a frame, ends
//! in the frame being forwarded unchanged.

mod stats;

pub use stats::{Stats, StatsSnapshot};

use crate::dns::DnsMessageParser;
use crate::matcher::SharedMatcher;
use crate::packet::{ports, Classification, PacketParser, Ports};
use bytes::Bytes;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

/// Outcome for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketDecision {
    /// Write the original frame back to the tunnel
    Forward,
    /// Discard the frame
    Drop,
    /// Frame was not understood; written back like [`PacketDecision::Forward`]
    Unsupported,
}

impl PacketDecision {
    /// Whether the frame goes back out
    pub fn is_forwarded(self) -> bool {
        !matches!(self, PacketDecision::Drop)
    }
}

/// Decision together with the bytes to emit
///
/// `bytes` is the original frame for `Forward` and `Unsupported`, and empty
/// for `Drop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// The decision
    pub decision: PacketDecision,
    /// Bytes to write to the tunnel
    pub bytes: Bytes,
}

/// Per-frame filter
#[derive(Debug, Clone)]
pub struct FilterDecisionEngine {
    matcher: SharedMatcher,
    stats: Arc<Stats>,
}

impl FilterDecisionEngine {
    /// Create an engine reading from the given matcher
    pub fn new(matcher: SharedMatcher) -> Self {
        Self {
            matcher,
            stats: Arc::new(Stats::new()),
        }
    }

    /// The matcher this engine consults
    pub fn matcher(&self) -> &SharedMatcher {
        &self.matcher
    }

    /// Decision counters
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Decide what to do with a frame read from the tunnel
    #[instrument(level = "trace", skip_all, fields(len = packet.len()))]
    pub fn decide(&self, packet: Bytes) -> Verdict {
        self.stats.record_packet();

        let decision = self.guarded(|| self.evaluate(&packet));
        self.stats.record_decision(decision);

        match decision {
            PacketDecision::Drop => Verdict {
                decision,
                bytes: Bytes::new(),
            },
            PacketDecision::Forward | PacketDecision::Unsupported => Verdict {
                decision,
                bytes: packet,
            },
        }
    }

    /// Run an evaluation, turning a panic into `Forward`
    fn guarded<F>(&self, evaluate: F) -> PacketDecision
    where
        F: FnOnce() -> PacketDecision,
    {
        match panic::catch_unwind(AssertUnwindSafe(evaluate)) {
            Ok(decision) => decision,
            Err(payload) => {
                self.stats.record_fault();
                warn!(
                    reason = panic_message(payload.as_ref()),
                    "Fault while inspecting packet, forwarding"
                );
                PacketDecision::Forward
            }
        }
    }

    fn evaluate(&self, packet: &[u8]) -> PacketDecision {
        match PacketParser::classify(packet) {
            Classification::Unsupported(fault) => {
                trace!(
                    %fault,
                    head = %hex::encode(&packet[..packet.len().min(20)]),
                    "Unsupported frame"
                );
                PacketDecision::Unsupported
            }
            Classification::Dns {
                header,
                payload_offset,
                ..
            } => {
                let Some(query) = packet
                    .get(payload_offset..)
                    .and_then(DnsMessageParser::parse)
                else {
                    return PacketDecision::Forward;
                };

                if query.is_query {
                    self.stats.record_dns_query();
                }

                let Some(domain) = query.domain else {
                    return PacketDecision::Forward;
                };

                if self.matcher.is_blocked(Some(&domain)) {
                    debug!(
                        domain = %domain,
                        src = %header.src_addr,
                        dst = %header.dst_addr,
                        id = query.transaction_id,
                        "Dropping blocked DNS query"
                    );
                    PacketDecision::Drop
                } else {
                    trace!(domain = %domain, "DNS query allowed");
                    PacketDecision::Forward
                }
            }
            Classification::Web {
                ports: tcp_ports,
                transport_offset,
                ..
            } => {
                let segment = packet.get(transport_offset..).unwrap_or_default();
                Self::inspect_web(tcp_ports, segment)
            }
            Classification::Passthrough => PacketDecision::Forward,
        }
    }

    fn inspect_web(tcp_ports: Ports, segment: &[u8]) -> PacketDecision {
        if tcp_ports.either(ports::HTTPS) {
            Self::inspect_tls_sni(segment)
        } else {
            Self::inspect_http_host(segment)
        }
    }

    /// HTTP `Host` header inspection hook
    ///
    /// Inert: TCP payloads are not reassembled, so port-80 segments are always
    /// forwarded.
    pub fn inspect_http_host(_segment: &[u8]) -> PacketDecision {
        PacketDecision::Forward
    }

    /// TLS ClientHello SNI inspection hook
    ///
    /// Inert: port-443 segments are always forwarded.
    pub fn inspect_tls_sni(_segment: &[u8]) -> PacketDecision {
        PacketDecision::Forward
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown"
    }
}
