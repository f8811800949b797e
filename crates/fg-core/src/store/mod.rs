//! Persistent blocklist storage
//!
//! The store is the source of truth for blocked patterns; the matcher is a
//! cache rebuilt from it. Records are keyed by their normalized pattern, so
//! inserting an existing pattern replaces the old record.

mod file;
pub mod seed;

pub use file::FileStore;

use crate::error::Result;
use crate::matcher::{normalize, WILDCARD_PREFIX};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Well-known categories
pub mod category {
    /// Video platforms
    pub const YOUTUBE: &str = "youtube";
    /// Community and social sites
    pub const COMMUNITY: &str = "community";
    /// Added by the user
    pub const CUSTOM: &str = "custom";
}

/// A persisted blocklist entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedDomainRecord {
    /// Normalized pattern, `*.` prefix included for wildcards
    pub domain: String,
    /// Category the pattern belongs to
    pub category: String,
    /// Whether the pattern is a wildcard
    pub is_wildcard: bool,
    /// Insertion time in unix milliseconds
    pub added_at: u64,
}

impl BlockedDomainRecord {
    /// Create a record stamped with the current time
    pub fn new(domain: &str, category: &str) -> Self {
        let domain = normalize(domain);
        Self {
            is_wildcard: domain.starts_with(WILDCARD_PREFIX),
            domain,
            category: category.to_string(),
            added_at: unix_millis(),
        }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Storage backend for blocklist records
///
/// Implementations use interior mutability so a store can be shared behind
/// an `Arc` between the sync task and the CLI.
#[cfg_attr(test, mockall::automock)]
pub trait BlocklistStore: Send + Sync {
    /// Every stored record
    fn load_all(&self) -> Result<Vec<BlockedDomainRecord>>;

    /// Patterns that must never be blocked
    fn protected(&self) -> Vec<String> {
        seed::PROTECTED_DOMAINS.iter().map(ToString::to_string).collect()
    }

    /// Insert or replace a record
    fn insert(&self, record: BlockedDomainRecord) -> Result<()>;

    /// Insert or replace several records in one write
    fn insert_many(&self, records: Vec<BlockedDomainRecord>) -> Result<()>;

    /// Remove a record; returns whether one existed
    fn remove(&self, domain: &str) -> Result<bool>;

    /// Remove every record of a category, returning the removed records
    fn remove_category(&self, category: &str) -> Result<Vec<BlockedDomainRecord>>;

    /// Remove every record
    fn clear(&self) -> Result<()>;

    /// Number of stored records
    fn count(&self) -> Result<usize>;

    /// Records of one category
    fn list_by_category(&self, category: &str) -> Result<Vec<BlockedDomainRecord>>;
}

type RecordMap = BTreeMap<String, BlockedDomainRecord>;

fn insert_record(map: &mut RecordMap, mut record: BlockedDomainRecord) {
    record.domain = normalize(&record.domain);
    map.insert(record.domain.clone(), record);
}

fn drain_category(map: &mut RecordMap, category: &str) -> Vec<BlockedDomainRecord> {
    let keys: Vec<String> = map
        .values()
        .filter(|r| r.category == category)
        .map(|r| r.domain.clone())
        .collect();

    keys.iter().filter_map(|k| map.remove(k)).collect()
}

fn in_category(map: &RecordMap, category: &str) -> Vec<BlockedDomainRecord> {
    map.values().filter(|r| r.category == category).cloned().collect()
}

/// Volatile store for tests and ephemeral runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<RecordMap>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given records
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = BlockedDomainRecord>,
    {
        let mut map = RecordMap::new();
        for record in records {
            insert_record(&mut map, record);
        }
        Self {
            records: RwLock::new(map),
        }
    }
}

impl BlocklistStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<BlockedDomainRecord>> {
        Ok(self.records.read().values().cloned().collect())
    }

    fn insert(&self, record: BlockedDomainRecord) -> Result<()> {
        insert_record(&mut self.records.write(), record);
        Ok(())
    }

    fn insert_many(&self, records: Vec<BlockedDomainRecord>) -> Result<()> {
        let mut map = self.records.write();
        for record in records {
            insert_record(&mut map, record);
        }
        Ok(())
    }

    fn remove(&self, domain: &str) -> Result<bool> {
        Ok(self.records.write().remove(&normalize(domain)).is_some())
    }

    fn remove_category(&self, category: &str) -> Result<Vec<BlockedDomainRecord>> {
        Ok(drain_category(&mut self.records.write(), category))
    }

    fn clear(&self) -> Result<()> {
        self.records.write().clear();
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.records.read().len())
    }

    fn list_by_category(&self, category: &str) -> Result<Vec<BlockedDomainRecord>> {
        Ok(in_category(&self.records.read(), category))
    }
}
