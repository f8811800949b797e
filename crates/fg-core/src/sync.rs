//! Keeps the shared matcher in step with the blocklist store
//!
//! Every mutation goes to the store first and reaches the matcher only once
//! it has been persisted. A failed load leaves the matcher as it was, so a
//! store that is unavailable at startup means nothing is blocked.

use crate::error::{Error, Result};
use crate::matcher::{normalize, BlockedDomainPattern, DomainMatcher, SharedMatcher};
use crate::store::{seed, BlockedDomainRecord, BlocklistStore};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Blocklist synchronizer
#[derive(Clone)]
pub struct BlocklistSync {
    store: Arc<dyn BlocklistStore>,
    matcher: SharedMatcher,
    seed_defaults: bool,
}

impl BlocklistSync {
    /// Create a synchronizer publishing into `matcher`
    pub fn new(store: Arc<dyn BlocklistStore>, matcher: SharedMatcher) -> Self {
        Self {
            store,
            matcher,
            seed_defaults: true,
        }
    }

    /// Whether an empty store is seeded with the built-in categories
    #[must_use]
    pub fn with_seed_defaults(mut self, seed_defaults: bool) -> Self {
        self.seed_defaults = seed_defaults;
        self
    }

    /// The matcher being kept up to date
    pub fn matcher(&self) -> &SharedMatcher {
        &self.matcher
    }

    /// The backing store
    pub fn store(&self) -> &Arc<dyn BlocklistStore> {
        &self.store
    }

    /// Seed an empty store if configured to, then load the matcher
    ///
    /// Returns the number of patterns loaded.
    pub fn initialize(&self) -> Result<usize> {
        if self.seed_defaults && self.store.count()? == 0 {
            let records = seed::default_records();
            info!(count = records.len(), "First run, seeding default blocklist");
            self.store.insert_many(records)?;
        }

        self.reload()
    }

    /// Rebuild the matcher from the store and publish it in one swap
    pub fn reload(&self) -> Result<usize> {
        let records = self.store.load_all()?;
        let protected: HashSet<String> = self
            .store
            .protected()
            .iter()
            .map(|p| normalize(p))
            .collect();

        let mut matcher = DomainMatcher::new();
        for record in &records {
            if protected.contains(&normalize(&record.domain)) {
                warn!(domain = %record.domain, "Skipping protected domain in blocklist");
                continue;
            }
            matcher.add_domain(&record.domain);
        }

        let count = matcher.count();
        self.matcher.replace(matcher);
        info!(count, "Blocklist loaded");
        Ok(count)
    }

    /// Block a pattern under `category`
    pub fn add_domain(&self, domain: &str, category: &str) -> Result<BlockedDomainRecord> {
        let pattern = BlockedDomainPattern::parse(domain).ok_or_else(|| Error::InvalidPattern {
            pattern: domain.to_string(),
        })?;

        if self.is_protected(&pattern.pattern) {
            warn!(domain = %pattern.pattern, "Refusing to block protected domain");
            return Err(Error::ProtectedDomain {
                domain: pattern.pattern,
            });
        }

        let record = BlockedDomainRecord::new(&pattern.pattern, category);
        self.store.insert(record.clone())?;
        self.matcher.add_domain(&record.domain);

        info!(domain = %record.domain, category, "Added domain");
        Ok(record)
    }

    /// Unblock a pattern; returns whether the store held it
    pub fn remove_domain(&self, domain: &str) -> Result<bool> {
        let domain = normalize(domain);
        let removed = self.store.remove(&domain)?;
        self.matcher.remove_domain(&domain);

        info!(domain = %domain, removed, "Removed domain");
        Ok(removed)
    }

    /// Unblock every pattern of a category; returns how many were removed
    pub fn remove_category(&self, category: &str) -> Result<usize> {
        let removed = self.store.remove_category(category)?;
        self.matcher.update(|m| {
            for record in &removed {
                m.remove_domain(&record.domain);
            }
        });

        info!(category, count = removed.len(), "Removed category");
        Ok(removed.len())
    }

    /// Unblock everything
    pub fn clear_all(&self) -> Result<()> {
        self.store.clear()?;
        self.matcher.clear();

        info!("Cleared all domains");
        Ok(())
    }

    /// Check a domain against the current matcher
    pub fn is_blocked(&self, domain: Option<&str>) -> bool {
        self.matcher.is_blocked(domain)
    }

    fn is_protected(&self, pattern: &str) -> bool {
        self.store.protected().iter().any(|p| normalize(p) == pattern)
    }
}
