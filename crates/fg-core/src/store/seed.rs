//! Built-in blocklist categories and the protected list

use super::{category, BlockedDomainRecord};
use crate::matcher::normalize;

/// Video platform domains
pub const YOUTUBE_DOMAINS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "youtu.be",
    "youtube-nocookie.com",
    "youtubei.googleapis.com",
    "*.youtube.com",
    "*.googlevideo.com",
    "youtubeeducation.com",
    "*.youtubeeducation.com",
    "youtubekids.com",
    "*.youtubekids.com",
];

/// Community, streaming and social sites
pub const COMMUNITY_DOMAINS: &[&str] = &[
    "blind.com",
    "www.blind.com",
    "teamblind.com",
    "*.teamblind.com",
    "dcinside.com",
    "www.dcinside.com",
    "m.dcinside.com",
    "gall.dcinside.com",
    "*.dcinside.com",
    "clien.net",
    "www.clien.net",
    "m.clien.net",
    "mlbpark.donga.com",
    "theqoo.net",
    "www.theqoo.net",
    "m.theqoo.net",
    "*.theqoo.net",
    "instiz.net",
    "www.instiz.net",
    "*.instiz.net",
    "fmkorea.com",
    "*.fmkorea.com",
    "ruliweb.com",
    "*.ruliweb.com",
    "slrclub.com",
    "*.slrclub.com",
    "afreecatv.com",
    "www.afreecatv.com",
    "m.afreecatv.com",
    "*.afreecatv.com",
    "play.afreecatv.com",
    "twitch.tv",
    "www.twitch.tv",
    "m.twitch.tv",
    "*.twitch.tv",
    "instagram.com",
    "www.instagram.com",
    "*.instagram.com",
    "facebook.com",
    "www.facebook.com",
    "m.facebook.com",
    "*.facebook.com",
    "tiktok.com",
    "www.tiktok.com",
    "m.tiktok.com",
    "*.tiktok.com",
];

/// Patterns that may never be blocked
///
/// Blocking these would take down the platform services the device itself
/// depends on.
pub const PROTECTED_DOMAINS: &[&str] = &[
    "google.com",
    "*.google.com",
    "android.com",
    "*.android.com",
    "gstatic.com",
    "*.gstatic.com",
    "googleapis.com",
    "*.googleapis.com",
];

/// Records for every built-in category
pub fn default_records() -> Vec<BlockedDomainRecord> {
    let youtube = YOUTUBE_DOMAINS
        .iter()
        .map(|d| BlockedDomainRecord::new(d, category::YOUTUBE));
    let community = COMMUNITY_DOMAINS
        .iter()
        .map(|d| BlockedDomainRecord::new(d, category::COMMUNITY));

    youtube.chain(community).collect()
}

/// Whether a pattern is one of the protected patterns
///
/// Comparison is on the normalized pattern text: `google.com` and
/// `*.google.com` are protected, a specific subdomain such as
/// `youtubei.googleapis.com` is not.
pub fn is_protected(pattern: &str) -> bool {
    let pattern = normalize(pattern);
    PROTECTED_DOMAINS.iter().any(|p| *p == pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_records_categories() {
        let records = default_records();
        assert_eq!(records.len(), YOUTUBE_DOMAINS.len() + COMMUNITY_DOMAINS.len());
        assert!(records
            .iter()
            .any(|r| r.domain == "*.youtube.com" && r.is_wildcard && r.category == "youtube"));
        assert!(records
            .iter()
            .any(|r| r.domain == "twitch.tv" && !r.is_wildcard && r.category == "community"));
    }

    #[test]
    fn test_seed_lists_hold_no_protected_patterns() {
        for domain in YOUTUBE_DOMAINS.iter().chain(COMMUNITY_DOMAINS) {
            assert!(!is_protected(domain), "{domain} is protected");
        }
    }

    #[test]
    fn test_is_protected() {
        assert!(is_protected("google.com"));
        assert!(is_protected(" *.GStatic.com "));
        assert!(!is_protected("youtubei.googleapis.com"));
        assert!(!is_protected("notgoogle.com"));
    }
}
