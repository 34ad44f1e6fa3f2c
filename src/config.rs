//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the router's runtime behavior,
//! following the same load-once-at-startup pattern as the rest of this crate.
//!
//! ## Environment Variables
//!
//! ### `VIADUCT_TRAILING_SLASH`
//!
//! One of `strict`, `ignore`, `redirect`. Default: `strict`.
//!
//! ### `VIADUCT_TRAILING_SLASH_REDIRECT_STATUS`
//!
//! HTTP status used when `VIADUCT_TRAILING_SLASH=redirect`. One of 301, 302,
//! 307, 308. Default: 301.
//!
//! ### `VIADUCT_SEGMENT_CACHE_MAX`
//!
//! Bound on the normalized-path segment cache. Accepts decimal or `0x`-prefixed
//! hex, mirroring `BRRTR_STACK_SIZE` in the original router. Default: 1000.

use std::env;

/// Trailing-slash handling policy applied during path normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingSlashPolicy {
    /// `/a` and `/a/` are distinct routes.
    Strict,
    /// Trailing slashes are stripped silently before matching.
    Ignore,
    /// A request with a trailing slash gets redirected to the stripped path.
    Redirect,
}

impl TrailingSlashPolicy {
    fn from_env_str(s: &str) -> Self {
        match s {
            "ignore" => TrailingSlashPolicy::Ignore,
            "redirect" => TrailingSlashPolicy::Redirect,
            _ => TrailingSlashPolicy::Strict,
        }
    }
}

/// Runtime configuration loaded from environment variables.
///
/// Load this once at startup with [`Config::from_env()`].
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub trailing_slash: TrailingSlashPolicy,
    pub trailing_slash_redirect_status: u16,
    pub segment_cache_max: usize,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// documented defaults when a variable is absent or unparsable.
    pub fn from_env() -> Self {
        let trailing_slash = env::var("VIADUCT_TRAILING_SLASH")
            .map(|v| TrailingSlashPolicy::from_env_str(&v))
            .unwrap_or(TrailingSlashPolicy::Strict);

        let trailing_slash_redirect_status = match env::var("VIADUCT_TRAILING_SLASH_REDIRECT_STATUS") {
            Ok(val) => match val.parse::<u16>() {
                Ok(status) if [301, 302, 307, 308].contains(&status) => status,
                _ => 301,
            },
            Err(_) => 301,
        };

        let segment_cache_max = match env::var("VIADUCT_SEGMENT_CACHE_MAX") {
            Ok(val) => {
                if let Some(hex) = val.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).unwrap_or(1000)
                } else {
                    val.parse().unwrap_or(1000)
                }
            }
            Err(_) => 1000,
        };

        Config {
            trailing_slash,
            trailing_slash_redirect_status,
            segment_cache_max,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            trailing_slash: TrailingSlashPolicy::Strict,
            trailing_slash_redirect_status: 301,
            segment_cache_max: 1000,
        }
    }
}
