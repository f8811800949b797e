//! Blocked-domain matching
//!
//! [`DomainMatcher`] is the in-memory index of blocked patterns. It supports:
//! - Exact domain matching (`youtube.com` blocks only `youtube.com`)
//! - Wildcard matching (`*.youtube.com` blocks `youtube.com` and every subdomain)
//!
//! The matcher itself is a plain data structure with no interior
//! mutability. [`SharedMatcher`] wraps it for the packet path: readers load an
//! immutable snapshot, writers publish a new one.

mod shared;

pub use shared::SharedMatcher;

use std::collections::HashSet;
use tracing::{debug, trace};

/// Prefix marking a wildcard pattern
pub const WILDCARD_PREFIX: &str = "*.";

/// A stored blocklist pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockedDomainPattern {
    /// Normalized pattern text, including the `*.` prefix for wildcards
    pub pattern: String,
    /// Whether this is a wildcard pattern
    pub is_wildcard: bool,
}

impl BlockedDomainPattern {
    /// Normalize a raw pattern
    ///
    /// Returns `None` for blank input and for the degenerate wildcard `*.`.
    pub fn parse(raw: &str) -> Option<Self> {
        let pattern = normalize(raw);
        if pattern.is_empty() {
            return None;
        }

        match pattern.strip_prefix(WILDCARD_PREFIX) {
            Some("") => None,
            Some(_) => Some(Self {
                pattern,
                is_wildcard: true,
            }),
            None => Some(Self {
                pattern,
                is_wildcard: false,
            }),
        }
    }

    /// Base domain of the pattern (the part after `*.` for wildcards)
    pub fn base(&self) -> &str {
        if self.is_wildcard {
            &self.pattern[WILDCARD_PREFIX.len()..]
        } else {
            &self.pattern
        }
    }
}

/// A compiled wildcard rule
#[derive(Debug, Clone)]
struct WildcardRule {
    /// Original normalized pattern (`*.example.com`)
    pattern: String,
    /// Suffix to match, with its leading dot (`.example.com`)
    dotted_base: String,
}

impl WildcardRule {
    fn new(pattern: String) -> Self {
        let dotted_base = pattern[WILDCARD_PREFIX.len() - 1..].to_string();
        Self {
            pattern,
            dotted_base,
        }
    }

    fn base(&self) -> &str {
        &self.dotted_base[1..]
    }

    /// Zero or more dot-terminated labels followed by the base
    fn matches(&self, domain: &str) -> bool {
        domain == self.base() || domain.ends_with(self.dotted_base.as_str())
    }
}

/// In-memory index of blocked domain patterns
#[derive(Debug, Clone, Default)]
pub struct DomainMatcher {
    /// Exact domain matches
    exact: HashSet<String>,
    /// Wildcard rules in insertion order
    wildcards: Vec<WildcardRule>,
}

impl DomainMatcher {
    /// Create an empty matcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a matcher populated from raw patterns
    pub fn with_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matcher = Self::new();
        matcher.add_domains(domains);
        matcher
    }

    /// Add a domain pattern
    ///
    /// Supports:
    /// - Exact domains: "example.com"
    /// - Wildcard: "*.example.com" (matches the base and any subdomain)
    ///
    /// Adding a pattern that is already present has no effect.
    pub fn add_domain(&mut self, raw: &str) {
        let Some(parsed) = BlockedDomainPattern::parse(raw) else {
            debug!(pattern = raw, "Ignoring empty domain pattern");
            return;
        };

        if parsed.is_wildcard {
            if self.wildcards.iter().any(|w| w.pattern == parsed.pattern) {
                return;
            }
            trace!(pattern = %parsed.pattern, "Added wildcard pattern");
            self.wildcards.push(WildcardRule::new(parsed.pattern));
        } else {
            trace!(pattern = %parsed.pattern, "Added exact pattern");
            self.exact.insert(parsed.pattern);
        }
    }

    /// Add several domain patterns
    pub fn add_domains<I, S>(&mut self, domains: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for domain in domains {
            self.add_domain(domain.as_ref());
        }
    }

    /// Remove a domain pattern; missing patterns are ignored
    pub fn remove_domain(&mut self, raw: &str) {
        let pattern = normalize(raw);

        if pattern.starts_with(WILDCARD_PREFIX) {
            self.wildcards.retain(|w| w.pattern != pattern);
        } else {
            self.exact.remove(&pattern);
        }
    }

    /// Remove every pattern
    pub fn clear(&mut self) {
        self.exact.clear();
        self.wildcards.clear();
    }

    /// Check whether a domain is blocked
    ///
    /// `None` and blank input are never blocked.
    pub fn is_blocked(&self, domain: Option<&str>) -> bool {
        let Some(domain) = domain else {
            return false;
        };

        let domain = normalize(domain);
        if domain.is_empty() {
            return false;
        }

        if self.exact.contains(&domain) {
            debug!(domain = %domain, "Blocked (exact match)");
            return true;
        }

        if let Some(rule) = self.wildcards.iter().find(|w| w.matches(&domain)) {
            debug!(domain = %domain, pattern = %rule.pattern, "Blocked (wildcard match)");
            return true;
        }

        false
    }

    /// Total number of stored patterns
    pub fn count(&self) -> usize {
        self.exact.len() + self.wildcards.len()
    }

    /// Check if the matcher holds no patterns
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.wildcards.is_empty()
    }

    /// All stored patterns: exact ones sorted, then wildcards in insertion order
    pub fn patterns(&self) -> Vec<BlockedDomainPattern> {
        let mut exact: Vec<&String> = self.exact.iter().collect();
        exact.sort();

        exact
            .into_iter()
            .map(|p| BlockedDomainPattern {
                pattern: p.clone(),
                is_wildcard: false,
            })
            .chain(self.wildcards.iter().map(|w| BlockedDomainPattern {
                pattern: w.pattern.clone(),
                is_wildcard: true,
            }))
            .collect()
    }
}

/// Lowercase and trim a domain or pattern
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let matcher = DomainMatcher::with_domains(["youtube.com"]);

        assert!(matcher.is_blocked(Some("youtube.com")));
        assert!(!matcher.is_blocked(Some("m.youtube.com")));
        assert!(!matcher.is_blocked(Some("other.com")));
    }

    #[test]
    fn test_wildcard_match() {
        let matcher = DomainMatcher::with_domains(["*.youtube.com"]);

        assert!(matcher.is_blocked(Some("youtube.com")));
        assert!(matcher.is_blocked(Some("m.youtube.com")));
        assert!(matcher.is_blocked(Some("a.b.youtube.com")));
        assert!(!matcher.is_blocked(Some("notyoutube.com")));
        assert!(!matcher.is_blocked(Some("youtube.com.evil.net")));
    }

    #[test]
    fn test_case_and_whitespace_normalized() {
        let matcher = DomainMatcher::with_domains(["  YouTube.COM "]);

        assert!(matcher.is_blocked(Some("youtube.com")));
        assert!(matcher.is_blocked(Some("YOUTUBE.com")));
        assert!(matcher.is_blocked(Some(" youtube.com\t")));
    }

    #[test]
    fn test_blank_input_never_blocked() {
        let matcher = DomainMatcher::with_domains(["*.com", "localhost"]);

        assert!(!matcher.is_blocked(None));
        assert!(!matcher.is_blocked(Some("")));
        assert!(!matcher.is_blocked(Some("   ")));
        assert!(matcher.is_blocked(Some("localhost")));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut matcher = DomainMatcher::new();
        matcher.add_domain("x.com");
        matcher.add_domain("X.com");
        matcher.add_domain("*.x.com");
        matcher.add_domain("*.x.com ");

        assert_eq!(matcher.count(), 2);
    }

    #[test]
    fn test_exact_and_wildcard_are_independent() {
        let mut matcher = DomainMatcher::with_domains(["x.com", "*.x.com"]);
        matcher.remove_domain("*.x.com");

        assert!(matcher.is_blocked(Some("x.com")));
        assert!(!matcher.is_blocked(Some("a.x.com")));
        assert_eq!(matcher.count(), 1);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut matcher = DomainMatcher::with_domains(["a.com"]);
        matcher.remove_domain("b.com");
        matcher.remove_domain("*.b.com");
        matcher.remove_domain("");

        assert_eq!(matcher.count(), 1);
    }

    #[test]
    fn test_clear() {
        let mut matcher = DomainMatcher::with_domains(["a.com", "*.b.com"]);
        matcher.clear();

        assert_eq!(matcher.count(), 0);
        assert!(matcher.is_empty());
        assert!(!matcher.is_blocked(Some("a.com")));
        assert!(!matcher.is_blocked(Some("x.b.com")));
    }

    #[test]
    fn test_degenerate_patterns_ignored() {
        let matcher = DomainMatcher::with_domains(["", "   ", "*."]);
        assert!(matcher.is_empty());
    }

    #[test]
    fn test_patterns_listing() {
        let matcher = DomainMatcher::with_domains(["b.com", "*.z.com", "a.com", "*.c.com"]);
        let patterns: Vec<String> = matcher.patterns().into_iter().map(|p| p.pattern).collect();

        assert_eq!(patterns, vec!["a.com", "b.com", "*.z.com", "*.c.com"]);
    }

    #[test]
    fn test_pattern_parse() {
        let p = BlockedDomainPattern::parse(" *.Example.com").unwrap();
        assert!(p.is_wildcard);
        assert_eq!(p.pattern, "*.example.com");
        assert_eq!(p.base(), "example.com");

        let p = BlockedDomainPattern::parse("example.com").unwrap();
        assert!(!p.is_wildcard);
        assert_eq!(p.base(), "example.com");

        assert!(BlockedDomainPattern::parse("*.").is_none());
    }
}
