//! Decision counters

use super::PacketDecision;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the engine on every decision
///
/// All fields are relaxed atomics: they are read for diagnostics only and
/// impose no ordering on the packet path.
#[derive(Debug, Default)]
pub struct Stats {
    packets: AtomicU64,
    forwarded: AtomicU64,
    dropped: AtomicU64,
    unsupported: AtomicU64,
    dns_queries: AtomicU64,
    faults: AtomicU64,
    io_errors: AtomicU64,
}

/// Point-in-time copy of [`Stats`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Frames passed to the engine
    pub packets: u64,
    /// Frames returned unchanged after inspection
    pub forwarded: u64,
    /// Blocked DNS queries
    pub dropped: u64,
    /// Frames the parser did not understand
    pub unsupported: u64,
    /// DNS queries seen (QR bit clear)
    pub dns_queries: u64,
    /// Panics caught during evaluation
    pub faults: u64,
    /// Tunnel reads or writes that failed and were skipped
    pub io_errors: u64,
}

impl Stats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_packet(&self) {
        self.packets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dns_query(&self) {
        self.dns_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fault(&self) {
        self.faults.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a tunnel read or write that failed
    pub fn record_io_error(&self) {
        self.io_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decision(&self, decision: PacketDecision) {
        let counter = match decision {
            PacketDecision::Forward => &self.forwarded,
            PacketDecision::Drop => &self.dropped,
            PacketDecision::Unsupported => &self.unsupported,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current values
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            packets: self.packets.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            unsupported: self.unsupported.load(Ordering::Relaxed),
            dns_queries: self.dns_queries.load(Ordering::Relaxed),
            faults: self.faults.load(Ordering::Relaxed),
            io_errors: self.io_errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = Stats::new();
        stats.record_packet();
        stats.record_packet();
        stats.record_dns_query();
        stats.record_decision(PacketDecision::Drop);
        stats.record_decision(PacketDecision::Unsupported);
        stats.record_io_error();

        let snap = stats.snapshot();
        assert_eq!(snap.packets, 2);
        assert_eq!(snap.dns_queries, 1);
        assert_eq!(snap.dropped, 1);
        assert_eq!(snap.unsupported, 1);
        assert_eq!(snap.forwarded, 0);
        assert_eq!(snap.faults, 0);
        assert_eq!(snap.io_errors, 1);
    }
}
