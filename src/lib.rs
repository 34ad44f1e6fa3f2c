//! # Viaduct Router
//!
//! **Viaduct** is a multi-tenant, locale-aware HTTP routing and
//! request-pipeline engine for virtual hosts.
//!
//! ## Overview
//!
//! Viaduct compiles a declarative route table (exact hostnames, `*.base`
//! wildcard subdomains, and a global `*` fallback, each with its own nested
//! path tree) into a set of per-host tries. Matching a request walks host
//! tiers (exact, then wildcard, then global) and within the winning tier
//! resolves literal segments, named parameters, regex constraints, and
//! catch-all wildcards by trie priority. Routes may additionally declare
//! locale-prefixed variants (`/en/about`, `/fr/a-propos`, ...) which the
//! [`url::UrlBuilder`] resolves back into locale-correct links.
//!
//! Every matched route carries a resolved chain of [`pipeline::Plugin`]s: a
//! two-phase request/response pipeline with short-circuiting on the request
//! phase and an always-run, forward-order response phase, run before the
//! matched handler executes.
//!
//! ## Architecture
//!
//! - **[`route_def`]** - the fluent builder (`RouteTable`/`HostBuilder`/
//!   `Scope`/`RouteSpec`) used to describe hosts, nested paths, methods,
//!   locales, and plugin chains.
//! - **[`compiler`]** - turns a [`route_def::RouteTable`] into compiled
//!   tries, per-host locale configs, and a cross-host name table
//!   ([`compiler::compile`]), plus the [`compiler::PluginRegistry`] that
//!   resolves `use` identifiers to plugin instances.
//! - **[`router`]** - the [`router::Router`] that matches `(host, method,
//!   path)` against the compiled tables, the segment trie itself
//!   ([`router::trie`]), and path normalization / trailing-slash handling
//!   ([`router::normalize`]).
//! - **[`url`]** - the [`url::UrlBuilder`] that turns a route name plus
//!   parameters back into a path or absolute URL, resolving locale variants
//!   and the current request's host.
//! - **[`pipeline`]** - transport-neutral [`pipeline::Request`] /
//!   [`pipeline::Response`] types, the [`pipeline::Plugin`] protocol, the
//!   [`pipeline::HandlerRegistry`], and the [`pipeline::PipelineRunner`]
//!   that executes both around a matched route.
//! - **[`engine`]** - the [`engine::Engine`] that ties the above together
//!   into the one call a transport adapter needs:
//!   [`engine::Engine::handle`].
//! - **[`domain`]** - the per-request "current host" context URL helpers
//!   read when called without an explicit host.
//! - **[`plugins`]** - illustrative plugins (bearer auth, CSRF) showing the
//!   [`pipeline::Plugin`] protocol and composite registration; concrete
//!   plugins are otherwise outside this crate's scope.
//! - **[`config`]** - environment-driven runtime configuration
//!   ([`config::Config::from_env`]).
//! - **[`error`]** - the [`error::ConfigError`] / [`error::UrlError`]
//!   taxonomy for compilation and URL-generation failures.
//! - **[`ids`]** - the [`ids::RequestId`] (ULID-backed) carried on every
//!   [`pipeline::Request`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use viaduct_router::config::Config;
//! use viaduct_router::engine::Engine;
//! use viaduct_router::pipeline::{Handler, HandlerResult, ParamMap, Request};
//! use viaduct_router::route_def::{HostBuilder, RouteSpec, RouteTable};
//!
//! struct ShowPost;
//! impl Handler for ShowPost {
//!     fn call(&self, _request: &Request, params: &ParamMap) -> HandlerResult {
//!         HandlerResult::Text(format!("post {}", params.get("id").unwrap()))
//!     }
//! }
//!
//! let table = RouteTable::new().host(
//!     HostBuilder::new("example.com")
//!         .path("posts", |s| {
//!             s.path(":id", |s2| s2.get(RouteSpec::new("posts#show").named("post_show")))
//!         })
//!         .build(),
//! );
//!
//! let mut engine = Engine::new(Config::default());
//! engine.handlers_mut().register("posts#show", Arc::new(ShowPost));
//! engine.define(&table).unwrap();
//!
//! let response = engine.handle(Request::new(http::Method::GET, "example.com", "/posts/42"));
//! assert_eq!(response.status, 200);
//! ```

pub mod compiler;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ids;
pub mod pipeline;
pub mod plugins;
pub mod route_def;
pub mod router;
pub mod url;

pub use compiler::{compile, CompiledRoutes, DomainConfig, PluginRegistry, RouteMeta};
pub use engine::Engine;
pub use error::{ConfigError, UrlError};
pub use ids::RequestId;
pub use pipeline::{Decision, Handler, HandlerRegistry, HandlerResult, Plugin, Request, Response};
pub use route_def::{HostBuilder, RouteSpec, RouteTable, Scope};
pub use router::{RouteResolution, Router};
pub use url::UrlBuilder;
