//! Compiled route metadata, produced by [`crate::compiler::compile`] from a
//! [`crate::route_def::RouteTable`].

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use regex::Regex;

use crate::pipeline::Plugin;

/// One segment of a compiled route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
    Wildcard(String),
}

/// The compiled record for a single (host, method, pattern) route.
#[derive(Clone)]
pub struct RouteMeta {
    pub domain: String,
    pub name: String,
    pub handler: String,
    pub use_: Vec<Arc<dyn Plugin>>,
    pub method: Method,
    pub segments: Vec<Segment>,
    pub param_names: Vec<String>,
    pub constraints: HashMap<String, Regex>,
    pub locale: Option<String>,
    /// True for the base (non-locale) entry of a `localized` route. Base
    /// entries are registered in the name table but never inserted into the
    /// trie; they exist purely so URL generation without an explicit
    /// locale can still resolve the canonical name.
    pub localized: bool,
}

impl RouteMeta {
    /// Render the pattern back out as a `/`-joined string, for diagnostics
    /// and for the metadata-table key.
    pub fn pattern(&self) -> String {
        let mut out = String::from("/");
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('/');
            }
            match seg {
                Segment::Literal(s) => out.push_str(s),
                Segment::Param(name) => {
                    out.push(':');
                    out.push_str(name);
                }
                Segment::Wildcard(name) => {
                    out.push('*');
                    out.push_str(name);
                }
            }
        }
        out
    }

    /// Metadata-table key: `"domain:METHOD:pattern"`.
    pub fn key(&self) -> String {
        format!("{}:{}:{}", self.domain, self.method, self.pattern())
    }
}
