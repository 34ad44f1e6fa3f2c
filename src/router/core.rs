//! The multi-host [`Router`]: exact-host trie, then wildcard-subdomain
//! tries, then the global `*` fallback, exactly as described in §4.2.
//!
//! Compiled tables are published with [`arc_swap::ArcSwap`] so a `define()`
//! rebuild never exposes a half-built trie to a concurrent reader; readers
//! always see either the old or the new snapshot in full.

use std::collections::HashMap;

use arc_swap::ArcSwap;
use http::Method;
use tracing::debug;

use crate::compiler::{compile, CompiledRoutes, PluginRegistry};
use crate::config::Config;
use crate::error::ConfigError;
use crate::pipeline::Plugin;
use crate::route_def::RouteTable;
use crate::router::normalize::SegmentCacheHandle;
use crate::router::trie::get_param;

use std::sync::Arc;

/// The outcome of a successful match.
pub struct RouteResolution {
    pub name: String,
    pub handler: String,
    pub use_: Vec<Arc<dyn Plugin>>,
    pub params: HashMap<String, String>,
    pub locale: Option<String>,
    pub domain: String,
    pub subdomain: Option<String>,
}

pub struct Router {
    compiled: ArcSwap<CompiledRoutes>,
    pub config: Config,
    segment_cache: SegmentCacheHandle,
    default_host: Option<String>,
}

impl Router {
    pub fn new(config: Config) -> Self {
        Router {
            compiled: ArcSwap::from_pointee(CompiledRoutes::default()),
            segment_cache: SegmentCacheHandle::new(config.segment_cache_max),
            config,
            default_host: None,
        }
    }

    #[must_use]
    pub fn with_default_host(mut self, host: impl Into<String>) -> Self {
        self.default_host = Some(host.into());
        self
    }

    pub fn default_host(&self) -> Option<&str> {
        self.default_host.as_deref()
    }

    /// Look up a named route (base or `name_locale` variant) across all
    /// hosts, for the URL builder.
    pub fn lookup_name(&self, name: &str) -> Option<Arc<crate::compiler::RouteMeta>> {
        self.compiled.load().names.get(name).cloned()
    }

    /// Fetch a host's locale configuration, falling back to the `*` host's
    /// configuration when `host` is not explicitly registered.
    pub fn domain_config(&self, host: &str) -> Option<crate::compiler::DomainConfig> {
        let compiled = self.compiled.load();
        let host = host.to_lowercase();
        if let Some(tables) = compiled.exact.get(&host) {
            return Some(tables.domain.clone());
        }
        for (base, tables) in &compiled.wildcard {
            if &host == base || host.ends_with(&format!(".{base}")) {
                return Some(tables.domain.clone());
            }
        }
        compiled.global.as_ref().map(|t| t.domain.clone())
    }

    /// Atomically replace the compiled route tables. Concurrent readers
    /// never observe a partially built trie.
    pub fn define(&self, table: &RouteTable, registry: &PluginRegistry) -> Result<(), ConfigError> {
        let compiled = compile(table, registry)?;
        debug!("publishing new route table");
        self.compiled.store(Arc::new(compiled));
        Ok(())
    }

    /// `path` must already be normalized by the caller (see
    /// [`crate::router::normalize::normalize_path`]) but keeps its original
    /// case; `host` is lowercased below. Literal-segment comparison inside
    /// the trie lowercases its own key, so callers never need to lowercase
    /// `path` themselves.
    pub fn match_request(&self, host: &str, method: &Method, path: &str) -> Option<RouteResolution> {
        let host = host.to_lowercase();
        let compiled = self.compiled.load();

        let cached = self.segment_cache.segments(path);
        let segments: Vec<&str> = cached.iter().map(String::as_str).collect();

        if let Some(tables) = compiled.exact.get(&host) {
            if let Some((meta, params)) = tables.trie.search_segments(&segments, method) {
                return Some(resolve(meta, params, host, None));
            }
        }

        for (base, tables) in &compiled.wildcard {
            let subdomain = if &host == base {
                Some(None)
            } else if let Some(prefix) = host.strip_suffix(&format!(".{base}")) {
                Some(Some(prefix.to_string()))
            } else {
                None
            };
            if let Some(subdomain) = subdomain {
                if let Some((meta, params)) = tables.trie.search_segments(&segments, method) {
                    return Some(resolve(meta, params, base.clone(), subdomain));
                }
                break;
            }
        }

        if let Some(tables) = &compiled.global {
            if let Some((meta, params)) = tables.trie.search_segments(&segments, method) {
                return Some(resolve(meta, params, host, None));
            }
        }

        None
    }
}

fn resolve(
    meta: Arc<crate::compiler::RouteMeta>,
    captured: crate::router::trie::ParamVec,
    domain: String,
    subdomain: Option<String>,
) -> RouteResolution {
    let mut params: HashMap<String, String> = HashMap::with_capacity(captured.len());
    for name in dedup_names(&captured) {
        if let Some(value) = get_param(&captured, &name) {
            params.insert(name, value.to_string());
        }
    }
    if let Some(sub) = &subdomain {
        params.insert("subdomain".to_string(), sub.clone());
    }

    RouteResolution {
        name: meta.name.clone(),
        handler: meta.handler.clone(),
        use_: meta.use_.clone(),
        params,
        locale: meta.locale.clone(),
        domain,
        subdomain,
    }
}

fn dedup_names(captured: &crate::router::trie::ParamVec) -> Vec<String> {
    let mut seen = Vec::new();
    for (name, _) in captured {
        if !seen.contains(name) {
            seen.push(name.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route_def::{HostBuilder, RouteSpec, RouteTable};

    fn router_with(table: RouteTable) -> Router {
        let router = Router::new(Config::default());
        let registry = PluginRegistry::new();
        router.define(&table, &registry).unwrap();
        router
    }

    #[test]
    fn exact_host_beats_wildcard_and_global() {
        let table = RouteTable::new()
            .host(
                HostBuilder::new("example.com")
                    .get(RouteSpec::new("pages#home").named("home"))
                    .build(),
            )
            .host(
                HostBuilder::new("*.example.com")
                    .get(RouteSpec::new("tenant#home").named("tenant_home"))
                    .build(),
            );
        let router = router_with(table);
        let resolution = router
            .match_request("example.com", &Method::GET, "/")
            .expect("exact host should match");
        assert_eq!(resolution.name, "home");
    }

    #[test]
    fn wildcard_host_extracts_subdomain() {
        let table = RouteTable::new().host(
            HostBuilder::new("*.example.com")
                .get(RouteSpec::new("tenant#ping").named("tenant_ping"))
                .build(),
        );
        let router = router_with(table);
        let resolution = router
            .match_request("acme.example.com", &Method::GET, "/")
            .expect("wildcard host should match");
        assert_eq!(resolution.subdomain.as_deref(), Some("acme"));
        assert_eq!(resolution.params.get("subdomain").map(String::as_str), Some("acme"));
    }

    #[test]
    fn global_fallback_used_when_no_host_specific_match() {
        let table = RouteTable::new().host(
            HostBuilder::new("*")
                .get(RouteSpec::new("pages#fallback").named("fallback"))
                .build(),
        );
        let router = router_with(table);
        let resolution = router
            .match_request("anything.invalid", &Method::GET, "/")
            .expect("global host should match");
        assert_eq!(resolution.name, "fallback");
    }

    #[test]
    fn no_match_returns_none() {
        let table = RouteTable::new().host(
            HostBuilder::new("example.com")
                .get(RouteSpec::new("pages#home").named("home"))
                .build(),
        );
        let router = router_with(table);
        assert!(router.match_request("example.com", &Method::GET, "/missing").is_none());
    }
}
