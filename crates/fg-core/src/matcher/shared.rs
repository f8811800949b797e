//! Snapshot-swapped matcher shared between the packet loop and the sync task

use super::DomainMatcher;
use arc_swap::{ArcSwap, Guard};
use parking_lot::Mutex;
use std::sync::Arc;

/// Lock-free shared view of a [`DomainMatcher`]
///
/// Readers call [`SharedMatcher::is_blocked`] or [`SharedMatcher::snapshot`]
/// and never wait on a lock. Writers clone the current snapshot, apply their
/// change and publish the result in one atomic store. Writers are serialized
/// with a mutex so two concurrent updates cannot overwrite each other.
///
/// A freshly created handle holds an empty matcher, so nothing is blocked
/// until the first load completes.
#[derive(Debug, Clone)]
pub struct SharedMatcher {
    current: Arc<ArcSwap<DomainMatcher>>,
    write_lock: Arc<Mutex<()>>,
}

impl SharedMatcher {
    /// Create a handle holding an empty matcher
    pub fn new() -> Self {
        Self::from_matcher(DomainMatcher::new())
    }

    /// Create a handle holding the given matcher
    pub fn from_matcher(matcher: DomainMatcher) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(matcher)),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Borrow the current snapshot
    pub fn snapshot(&self) -> Guard<Arc<DomainMatcher>> {
        self.current.load()
    }

    /// Check a domain against the current snapshot
    pub fn is_blocked(&self, domain: Option<&str>) -> bool {
        self.current.load().is_blocked(domain)
    }

    /// Number of patterns in the current snapshot
    pub fn count(&self) -> usize {
        self.current.load().count()
    }

    /// Publish a fully built matcher, replacing the current one
    pub fn replace(&self, matcher: DomainMatcher) {
        let _guard = self.write_lock.lock();
        self.current.store(Arc::new(matcher));
    }

    /// Apply a change to a copy of the current snapshot and publish it
    pub fn update<F>(&self, change: F)
    where
        F: FnOnce(&mut DomainMatcher),
    {
        let _guard = self.write_lock.lock();
        let mut next = DomainMatcher::clone(&self.current.load());
        change(&mut next);
        self.current.store(Arc::new(next));
    }

    /// Add a pattern
    pub fn add_domain(&self, raw: &str) {
        self.update(|m| m.add_domain(raw));
    }

    /// Remove a pattern
    pub fn remove_domain(&self, raw: &str) {
        self.update(|m| m.remove_domain(raw));
    }

    /// Remove every pattern
    pub fn clear(&self) {
        self.replace(DomainMatcher::new());
    }
}

impl Default for SharedMatcher {
    fn default() -> Self {
        Self::new()
    }
}
