//! Property tests for domain matching

use fg_core::{DomainMatcher, SharedMatcher};
use proptest::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn label() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9-]{0,14}"
}

proptest! {
    #[test]
    fn prop_arbitrary_strings_never_panic(pattern in any::<String>(), query in any::<String>()) {
        let mut matcher = DomainMatcher::new();
        matcher.add_domain(&pattern);
        let _ = matcher.is_blocked(Some(&query));
        matcher.remove_domain(&query);
        matcher.remove_domain(&pattern);
        prop_assert!(matcher.count() <= 1);
    }

    #[test]
    fn prop_empty_matcher_never_blocks(query in any::<String>()) {
        prop_assert!(!DomainMatcher::new().is_blocked(Some(&query)));
    }

    #[test]
    fn prop_exact_does_not_cover_subdomains(sub in label(), base in label()) {
        let domain = format!("{base}.com");
        let matcher = DomainMatcher::with_domains([domain.as_str()]);

        prop_assert!(matcher.is_blocked(Some(&domain)));
        let subdomain = format!("{sub}.{domain}");
        prop_assert!(!matcher.is_blocked(Some(&subdomain)));
    }

    #[test]
    fn prop_wildcard_covers_base_and_subdomains(
        subs in proptest::collection::vec(label(), 0..4),
        base in label(),
    ) {
        let domain = format!("{base}.net");
        let matcher = DomainMatcher::with_domains([format!("*.{domain}")]);

        let mut query = subs.join(".");
        if !query.is_empty() {
            query.push('.');
        }
        query.push_str(&domain);

        prop_assert!(matcher.is_blocked(Some(&query)));
        let lookalike = format!("x{domain}");
        prop_assert!(!matcher.is_blocked(Some(&lookalike)));
    }

    #[test]
    fn prop_remove_after_add_unblocks(base in label(), wildcard in any::<bool>()) {
        let domain = format!("{base}.org");
        let pattern = if wildcard { format!("*.{domain}") } else { domain.clone() };

        let mut matcher = DomainMatcher::new();
        matcher.add_domain(&pattern);
        prop_assert!(matcher.is_blocked(Some(&domain)));
        matcher.remove_domain(&pattern);
        prop_assert!(!matcher.is_blocked(Some(&domain)));
        prop_assert_eq!(matcher.count(), 0);
    }
}

#[test]
fn test_reader_observes_old_or_new_snapshot() {
    let shared = SharedMatcher::from_matcher(DomainMatcher::with_domains(["old.com"]));
    let stop = Arc::new(AtomicBool::new(false));

    let reader = {
        let shared = shared.clone();
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                let snapshot = shared.snapshot();
                let old = snapshot.is_blocked(Some("old.com"));
                let new = snapshot.is_blocked(Some("a.new.com"));
                assert!(old ^ new, "snapshot mixed old and new state");
            }
        })
    };

    for i in 0..500 {
        if i % 2 == 0 {
            shared.replace(DomainMatcher::with_domains(["*.new.com"]));
        } else {
            shared.replace(DomainMatcher::with_domains(["old.com"]));
        }
    }

    stop.store(true, Ordering::Relaxed);
    reader.join().unwrap();
}
