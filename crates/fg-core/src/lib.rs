//! # FocusGuard Core
//!
//! Platform-independent core of the packet-level domain filter.
//!
//! ## Architecture
//!
//! This crate provides:
//! - **Packet parsing** - Bounds-checked IPv4 / UDP / TCP header reads
//! - **DNS parsing** - Question-name extraction from DNS queries
//! - **Domain matching** - Exact and wildcard blocklist lookups behind a lock-free snapshot
//! - **Decision engine** - Fail-open forward/drop verdicts per frame
//! - **Blocklist storage** - File and in-memory stores kept in sync with the matcher
//! - **Configuration** - TOML configuration
//!
//! ## Example
//!
//! ```rust
//! use bytes::Bytes;
//! use fg_core::{FilterDecisionEngine, PacketDecision, SharedMatcher};
//!
//! let matcher = SharedMatcher::new();
//! matcher.add_domain("*.youtube.com");
//!
//! let engine = FilterDecisionEngine::new(matcher);
//! let verdict = engine.decide(Bytes::from_static(&[0x60, 0x00]));
//! assert_eq!(verdict.decision, PacketDecision::Unsupported);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dns;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod packet;
pub mod store;
pub mod sync;

// Re-exports for convenience
pub use config::Config;
pub use dns::{DnsMessageParser, ParsedDnsQuery};
pub use engine::{FilterDecisionEngine, PacketDecision, Stats, StatsSnapshot, Verdict};
pub use error::{Error, ParseFault, Result};
pub use matcher::{BlockedDomainPattern, DomainMatcher, SharedMatcher};
pub use packet::{Classification, PacketParser};
pub use store::{BlockedDomainRecord, BlocklistStore, FileStore, MemoryStore};
pub use sync::BlocklistSync;
