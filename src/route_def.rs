//! Input data model for [`crate::compiler::compile`].
//!
//! A [`RouteTable`] is a forest of [`HostDef`]s; each host owns a tree of
//! [`ScopeNode`]s mirroring the nested `use` / path-fragment / method
//! structure described by this crate's route-definition contract. The tree
//! is built with the fluent `Scope`/`Host` builders below rather than
//! constructed by hand; the tree shape itself is what
//! [`crate::compiler::compile::compile`] walks.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;

use crate::pipeline::Plugin;

/// A plugin referenced in a `use` list: either a registry lookup key
/// (resolved against a [`crate::compiler::PluginRegistry`] at compile time)
/// or an already-constructed instance.
#[derive(Clone)]
pub enum PluginRef {
    Name(String),
    Instance(Arc<dyn Plugin>),
}

impl PluginRef {
    pub fn name(s: impl Into<String>) -> Self {
        PluginRef::Name(s.into())
    }

    pub fn instance(p: Arc<dyn Plugin>) -> Self {
        PluginRef::Instance(p)
    }
}

/// Per-route configuration attached to a method key.
#[derive(Clone)]
pub struct RouteSpec {
    /// Opaque handler identifier, resolved against a handler registry at
    /// dispatch time (the core never calls into handler code directly).
    pub to: String,
    /// Globally unique (modulo locale-derived variants) route name used by
    /// the URL builder.
    pub as_: Option<String>,
    /// Plugins prepended to this route's effective (inherited) pipeline.
    pub use_: Vec<PluginRef>,
    /// Parameter name -> regex source; evaluated against captured values
    /// after a structural match.
    pub constraints: HashMap<String, String>,
    /// locale tag -> locale-specific relative path fragment (no locale
    /// prefix, no leading slash required).
    pub localized: HashMap<String, String>,
}

impl RouteSpec {
    pub fn new(to: impl Into<String>) -> Self {
        RouteSpec {
            to: to.into(),
            as_: None,
            use_: Vec::new(),
            constraints: HashMap::new(),
            localized: HashMap::new(),
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.as_ = Some(name.into());
        self
    }

    #[must_use]
    pub fn uses(mut self, plugin: PluginRef) -> Self {
        self.use_.push(plugin);
        self
    }

    #[must_use]
    pub fn constrain(mut self, param: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.constraints.insert(param.into(), pattern.into());
        self
    }

    #[must_use]
    pub fn localize(mut self, locale: impl Into<String>, path: impl Into<String>) -> Self {
        self.localized.insert(locale.into(), path.into());
        self
    }
}

/// A node in a host's scope tree: either a nested path fragment (carrying
/// its own inherited `use` list and further children) or a leaf binding a
/// method to a [`RouteSpec`].
pub enum ScopeNode {
    Scope {
        fragment: String,
        use_: Vec<PluginRef>,
        /// Mirrors the route-definition contract's "a `nil` value resets
        /// [the inherited `use` list] to empty" rule (`SPEC_FULL.md` §4.1):
        /// when set, this scope's effective pipeline is just its own `use_`
        /// (plus whatever its own children re-declare), with no merge
        /// against the parent's inherited list.
        reset_use: bool,
        children: Vec<ScopeNode>,
    },
    Method {
        method: Method,
        spec: RouteSpec,
    },
}

/// A fluent builder for one level of a host's path tree. `Scope::path`
/// nests; `Scope::route` binds a method at the current level.
#[derive(Default)]
pub struct Scope {
    use_: Vec<PluginRef>,
    reset_use: bool,
    children: Vec<ScopeNode>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn uses(mut self, plugin: PluginRef) -> Self {
        self.use_.push(plugin);
        self
    }

    /// Drop the parent's inherited `use` chain for this scope (and
    /// everything nested under it) rather than merging onto it — the
    /// builder's equivalent of setting `use: nil` in the route-definition
    /// contract. Plugins this scope itself `.uses(...)` still apply.
    #[must_use]
    pub fn clear_use(mut self) -> Self {
        self.reset_use = true;
        self
    }

    /// Nest a path fragment, configuring its own sub-scope via `build`.
    #[must_use]
    pub fn path(mut self, fragment: impl Into<String>, build: impl FnOnce(Scope) -> Scope) -> Self {
        let inner = build(Scope::new());
        self.children.push(ScopeNode::Scope {
            fragment: fragment.into(),
            use_: inner.use_,
            reset_use: inner.reset_use,
            children: inner.children,
        });
        self
    }

    #[must_use]
    pub fn route(mut self, method: Method, spec: RouteSpec) -> Self {
        self.children.push(ScopeNode::Method { method, spec });
        self
    }

    #[must_use]
    pub fn get(self, spec: RouteSpec) -> Self {
        self.route(Method::GET, spec)
    }

    #[must_use]
    pub fn post(self, spec: RouteSpec) -> Self {
        self.route(Method::POST, spec)
    }

    #[must_use]
    pub fn put(self, spec: RouteSpec) -> Self {
        self.route(Method::PUT, spec)
    }

    #[must_use]
    pub fn patch(self, spec: RouteSpec) -> Self {
        self.route(Method::PATCH, spec)
    }

    #[must_use]
    pub fn delete(self, spec: RouteSpec) -> Self {
        self.route(Method::DELETE, spec)
    }

    #[must_use]
    pub fn options(self, spec: RouteSpec) -> Self {
        self.route(Method::OPTIONS, spec)
    }

    fn into_children(self) -> (Vec<PluginRef>, Vec<ScopeNode>) {
        (self.use_, self.children)
    }
}

/// Top-level options and scope tree for one host pattern: an exact hostname,
/// `*.base` for a subdomain wildcard, or the literal `*` fallback.
pub struct HostDef {
    pub pattern: String,
    pub locales: Option<Vec<String>>,
    pub default_locale: Option<String>,
    pub root_locale_redirect: bool,
    pub use_: Vec<PluginRef>,
    pub children: Vec<ScopeNode>,
}

pub struct HostBuilder {
    pattern: String,
    locales: Option<Vec<String>>,
    default_locale: Option<String>,
    root_locale_redirect: bool,
    scope: Scope,
}

impl HostBuilder {
    pub fn new(pattern: impl Into<String>) -> Self {
        HostBuilder {
            pattern: pattern.into(),
            locales: None,
            default_locale: None,
            root_locale_redirect: true,
            scope: Scope::new(),
        }
    }

    #[must_use]
    pub fn locales<I, S>(mut self, locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locales = Some(locales.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = Some(locale.into());
        self
    }

    #[must_use]
    pub fn root_locale_redirect(mut self, enabled: bool) -> Self {
        self.root_locale_redirect = enabled;
        self
    }

    #[must_use]
    pub fn uses(mut self, plugin: PluginRef) -> Self {
        self.scope = self.scope.uses(plugin);
        self
    }

    #[must_use]
    pub fn path(mut self, fragment: impl Into<String>, build: impl FnOnce(Scope) -> Scope) -> Self {
        self.scope = self.scope.path(fragment, build);
        self
    }

    #[must_use]
    pub fn route(mut self, method: Method, spec: RouteSpec) -> Self {
        self.scope = self.scope.route(method, spec);
        self
    }

    #[must_use]
    pub fn get(self, spec: RouteSpec) -> Self {
        self.route(Method::GET, spec)
    }

    #[must_use]
    pub fn post(self, spec: RouteSpec) -> Self {
        self.route(Method::POST, spec)
    }

    #[must_use]
    pub fn put(self, spec: RouteSpec) -> Self {
        self.route(Method::PUT, spec)
    }

    #[must_use]
    pub fn patch(self, spec: RouteSpec) -> Self {
        self.route(Method::PATCH, spec)
    }

    #[must_use]
    pub fn delete(self, spec: RouteSpec) -> Self {
        self.route(Method::DELETE, spec)
    }

    #[must_use]
    pub fn options(self, spec: RouteSpec) -> Self {
        self.route(Method::OPTIONS, spec)
    }

    pub fn build(self) -> HostDef {
        let (use_, children) = self.scope.into_children();
        HostDef {
            pattern: self.pattern,
            locales: self.locales,
            default_locale: self.default_locale,
            root_locale_redirect: self.root_locale_redirect,
            use_,
            children,
        }
    }
}

/// A full route definition: every host this router knows about.
#[derive(Default)]
pub struct RouteTable {
    pub hosts: Vec<HostDef>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn host(mut self, host: HostDef) -> Self {
        self.hosts.push(host);
        self
    }
}
