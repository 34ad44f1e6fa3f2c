//! Path normalization and the trailing-slash policy (§4.5).
//!
//! A small bounded cache of normalized-path -> segment-list avoids
//! re-splitting hot paths; unlike an LRU, it is simply cleared in full once
//! its bound is reached rather than evicting entry-by-entry, which keeps the
//! hot path lock-cheap.

use std::sync::Mutex;

use crate::config::{Config, TrailingSlashPolicy};

/// Result of normalizing a raw request path.
pub enum Normalized {
    /// Proceed to matching with this path.
    Path(String),
    /// Respond immediately with a redirect to the given location.
    Redirect { location: String, status: u16 },
}

struct SegmentCache {
    entries: std::collections::HashMap<String, Vec<String>>,
    max: usize,
}

impl SegmentCache {
    fn new(max: usize) -> Self {
        SegmentCache {
            entries: std::collections::HashMap::new(),
            max,
        }
    }

    fn get_or_insert(&mut self, path: &str) -> Vec<String> {
        if let Some(existing) = self.entries.get(path) {
            return existing.clone();
        }
        if self.entries.len() >= self.max {
            self.entries.clear();
        }
        let segments: Vec<String> = path
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self.entries.insert(path.to_string(), segments.clone());
        segments
    }
}

/// Bounded segment cache, guarded by a mutex (contention only on the rare
/// full clear).
pub struct SegmentCacheHandle {
    inner: Mutex<SegmentCache>,
}

impl SegmentCacheHandle {
    pub fn new(max: usize) -> Self {
        SegmentCacheHandle {
            inner: Mutex::new(SegmentCache::new(max)),
        }
    }

    pub fn segments(&self, path: &str) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get_or_insert(path)
    }
}

fn percent_decode_once(path: &str) -> String {
    urlencoding::decode(path)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut last_was_slash = false;
    for c in path.chars() {
        if c == '/' {
            if last_was_slash {
                continue;
            }
            last_was_slash = true;
        } else {
            last_was_slash = false;
        }
        out.push(c);
    }
    out
}

/// Normalize a raw path per the configured trailing-slash policy.
///
/// Step order follows `SPEC_FULL.md` §4.5 exactly: empty -> `/`(1), collapse
/// repeated `/`(2), apply the trailing-slash policy(3), *then* percent-decode
/// once(4). Decoding after the trailing-slash check (rather than before)
/// keeps a `redirect` response's `Location` a literal prefix of the raw
/// path (an encoded trailing slash like `/a%2F` is never mistaken for a
/// literal one) and keeps normalization idempotent: a `redirect`'s stripped
/// location, or an `ignore`/`strict` path, only ever gets decoded once no
/// matter how many times it is re-normalized.
///
/// The returned path keeps the caller's original case: literal-segment
/// matching in [`crate::router::trie`] lowercases its own comparison key, but
/// captured `:param`/`*wildcard` values must see the path exactly as the
/// caller sent it (see `SPEC_FULL.md` §9's case-sensitivity resolution).
pub fn normalize_path(raw: &str, config: &Config) -> Normalized {
    let collapsed = if raw.is_empty() {
        "/".to_string()
    } else {
        collapse_slashes(raw)
    };

    let has_trailing_slash = collapsed.len() > 1 && collapsed.ends_with('/');

    match config.trailing_slash {
        TrailingSlashPolicy::Strict => Normalized::Path(percent_decode_once(&collapsed)),
        TrailingSlashPolicy::Ignore => {
            let stripped = if has_trailing_slash {
                collapsed.trim_end_matches('/')
            } else {
                collapsed.as_str()
            };
            Normalized::Path(percent_decode_once(stripped))
        }
        TrailingSlashPolicy::Redirect => {
            if has_trailing_slash {
                let stripped = collapsed.trim_end_matches('/').to_string();
                Normalized::Redirect {
                    location: stripped,
                    status: config.trailing_slash_redirect_status,
                }
            } else {
                Normalized::Path(percent_decode_once(&collapsed))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_becomes_root() {
        let cfg = Config::default();
        match normalize_path("", &cfg) {
            Normalized::Path(p) => assert_eq!(p, "/"),
            Normalized::Redirect { .. } => panic!("unexpected redirect"),
        }
    }

    #[test]
    fn multiple_slashes_collapse() {
        let cfg = Config::default();
        match normalize_path("//a//b", &cfg) {
            Normalized::Path(p) => assert_eq!(p, "/a/b"),
            Normalized::Redirect { .. } => panic!("unexpected redirect"),
        }
    }

    #[test]
    fn idempotent_normalization() {
        let cfg = Config::default();
        let once = match normalize_path("//A//B/", &cfg) {
            Normalized::Path(p) => p,
            Normalized::Redirect { .. } => panic!("unexpected redirect"),
        };
        let twice = match normalize_path(&once, &cfg) {
            Normalized::Path(p) => p,
            Normalized::Redirect { .. } => panic!("unexpected redirect"),
        };
        assert_eq!(once, twice);
    }

    #[test]
    fn redirect_policy_strips_trailing_slash() {
        let mut cfg = Config::default();
        cfg.trailing_slash = TrailingSlashPolicy::Redirect;
        match normalize_path("/a/", &cfg) {
            Normalized::Redirect { location, status } => {
                assert_eq!(location, "/a");
                assert_eq!(status, 301);
            }
            Normalized::Path(_) => panic!("expected redirect"),
        }
    }

    #[test]
    fn ignore_policy_strips_silently() {
        let mut cfg = Config::default();
        cfg.trailing_slash = TrailingSlashPolicy::Ignore;
        match normalize_path("/a/", &cfg) {
            Normalized::Path(p) => assert_eq!(p, "/a"),
            Normalized::Redirect { .. } => panic!("unexpected redirect"),
        }
    }

    #[test]
    fn strict_policy_preserves_trailing_slash() {
        let cfg = Config::default();
        match normalize_path("/a/", &cfg) {
            Normalized::Path(p) => assert_eq!(p, "/a/"),
            Normalized::Redirect { .. } => panic!("unexpected redirect"),
        }
    }

    #[test]
    fn normalization_preserves_original_case() {
        let cfg = Config::default();
        match normalize_path("/Users/John-Doe", &cfg) {
            Normalized::Path(p) => assert_eq!(p, "/Users/John-Doe"),
            Normalized::Redirect { .. } => panic!("unexpected redirect"),
        }
    }

    #[test]
    fn redirect_location_strips_the_raw_trailing_slash_without_decoding() {
        let mut cfg = Config::default();
        cfg.trailing_slash = TrailingSlashPolicy::Redirect;
        match normalize_path("/a%20/", &cfg) {
            Normalized::Redirect { location, status } => {
                assert_eq!(location, "/a%20");
                assert_eq!(status, 301);
            }
            Normalized::Path(_) => panic!("expected redirect"),
        }
    }

    #[test]
    fn percent_decode_runs_once_per_call_after_trailing_slash_handling() {
        let cfg = Config::default();
        let once = match normalize_path("/a%2520", &cfg) {
            Normalized::Path(p) => p,
            Normalized::Redirect { .. } => panic!("unexpected redirect"),
        };
        assert_eq!(once, "/a%20");
    }

    #[test]
    fn segment_cache_clears_on_bound() {
        let cache = SegmentCacheHandle::new(2);
        assert_eq!(cache.segments("/a/b"), vec!["a", "b"]);
        assert_eq!(cache.segments("/c"), vec!["c"]);
        // third distinct key hits the bound and clears first
        assert_eq!(cache.segments("/d/e/f"), vec!["d", "e", "f"]);
    }
}
