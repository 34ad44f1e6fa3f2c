//! # Router Module
//!
//! Multi-host route matching: per-host segment tries (`trie`), path
//! normalization and the trailing-slash policy (`normalize`), and the
//! top-level [`Router`] that resolves `(host, method, path)` against exact,
//! wildcard-subdomain, and global `*` host tiers (`core`). See
//! `SPEC_FULL.md` §4.2 and §4.5.

pub mod core;
pub mod normalize;
pub mod trie;

pub use core::{Router, RouteResolution};
pub use normalize::{normalize_path, Normalized};
pub use trie::{get_param, NameConflict, ParamVec};
