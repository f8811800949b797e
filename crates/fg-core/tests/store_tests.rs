//! Integration tests for the file store and blocklist sync

use fg_core::store::{category, seed};
use fg_core::{BlocklistStore, BlocklistSync, Error, FileStore, SharedMatcher};
use std::sync::Arc;
use tempfile::TempDir;

fn open_sync(dir: &TempDir) -> BlocklistSync {
    let store = FileStore::open(dir.path().join("blocklist.toml")).unwrap();
    BlocklistSync::new(Arc::new(store), SharedMatcher::new())
}

#[test]
fn test_first_run_seeds_and_persists() {
    let dir = TempDir::new().unwrap();

    let sync = open_sync(&dir);
    let loaded = sync.initialize().unwrap();
    assert_eq!(loaded, seed::default_records().len());
    assert!(sync.is_blocked(Some("www.youtube.com")));
    assert!(sync.is_blocked(Some("rr3---sn-abc.googlevideo.com")));

    let reopened = open_sync(&dir);
    assert_eq!(reopened.store().count().unwrap(), loaded);
}

#[test]
fn test_second_run_does_not_reseed_removed_categories() {
    let dir = TempDir::new().unwrap();

    let sync = open_sync(&dir);
    sync.initialize().unwrap();
    sync.remove_category(category::YOUTUBE).unwrap();

    let sync = open_sync(&dir);
    sync.initialize().unwrap();
    assert!(!sync.is_blocked(Some("youtube.com")));
    assert!(sync.is_blocked(Some("www.tiktok.com")));
}

#[test]
fn test_custom_domain_survives_restart() {
    let dir = TempDir::new().unwrap();

    let sync = open_sync(&dir).with_seed_defaults(false);
    sync.initialize().unwrap();
    let record = sync.add_domain("*.Reddit.com", category::CUSTOM).unwrap();
    assert_eq!(record.domain, "*.reddit.com");
    assert!(record.is_wildcard);

    let sync = open_sync(&dir).with_seed_defaults(false);
    assert_eq!(sync.initialize().unwrap(), 1);
    assert!(sync.is_blocked(Some("old.reddit.com")));
    assert_eq!(sync.store().list_by_category(category::CUSTOM).unwrap().len(), 1);
}

#[test]
fn test_protected_domain_rejected() {
    let dir = TempDir::new().unwrap();
    let sync = open_sync(&dir).with_seed_defaults(false);

    let err = sync.add_domain("*.googleapis.com", category::CUSTOM).unwrap_err();
    assert!(matches!(err, Error::ProtectedDomain { .. }));
    assert_eq!(sync.store().count().unwrap(), 0);
}

#[test]
fn test_clear_all_persists() {
    let dir = TempDir::new().unwrap();

    let sync = open_sync(&dir);
    sync.initialize().unwrap();
    sync.clear_all().unwrap();
    assert_eq!(sync.matcher().count(), 0);

    let store = FileStore::open(dir.path().join("blocklist.toml")).unwrap();
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_corrupt_store_is_rejected_and_left_alone() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blocklist.toml");
    std::fs::write(&path, "not [valid toml").unwrap();

    assert!(matches!(FileStore::open(&path), Err(Error::Store { .. })));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "not [valid toml");
}
