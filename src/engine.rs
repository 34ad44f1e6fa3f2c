//! # Engine
//!
//! [`Engine`] is the single seam a transport adapter calls through: it owns
//! the compiled [`Router`], the [`HandlerRegistry`], and the
//! [`PluginRegistry`], and turns one [`Request`] into one [`Response`] per
//! the control flow in `SPEC_FULL.md` §2 and §4.7. It never touches a
//! socket. A concrete adapter (CGI, hyper, actix, ...) builds the `Request`
//! and renders the `Response` back out.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::compiler::PluginRegistry;
use crate::config::Config;
use crate::domain::{DomainContext, DomainGuard};
use crate::pipeline::{HandlerRegistry, PipelineRunner, Request, Response};
use crate::route_def::RouteTable;
use crate::router::{normalize_path, Normalized, Router};

/// Overridable not-found / server-error responders. Defaults match §4.7 / §6.
pub type Responder = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

fn default_not_found(_request: &Request) -> Response {
    Response::not_found()
}

fn default_server_error(_request: &Request) -> Response {
    Response::server_error()
}

/// Ties the compiled route table, handler registry, and plugin registry
/// together into the one call an adapter needs: `handle(request)`.
pub struct Engine {
    router: Router,
    handlers: HandlerRegistry,
    plugins: PluginRegistry,
    not_found: Responder,
    server_error: Responder,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Engine {
            router: Router::new(config),
            handlers: HandlerRegistry::new(),
            plugins: PluginRegistry::new(),
            not_found: Arc::new(default_not_found),
            server_error: Arc::new(default_server_error),
        }
    }

    #[must_use]
    pub fn with_default_host(mut self, host: impl Into<String>) -> Self {
        self.router = self.router.with_default_host(host);
        self
    }

    #[must_use]
    pub fn with_not_found(mut self, responder: Responder) -> Self {
        self.not_found = responder;
        self
    }

    #[must_use]
    pub fn with_server_error(mut self, responder: Responder) -> Self {
        self.server_error = responder;
        self
    }

    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.handlers
    }

    pub fn plugins_mut(&mut self) -> &mut PluginRegistry {
        &mut self.plugins
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Publish a new route table, replacing the old one atomically (see
    /// [`Router::define`]).
    pub fn define(&self, table: &RouteTable) -> Result<(), crate::error::ConfigError> {
        self.router.define(table, &self.plugins)
    }

    /// Run the full request -> response control flow for one request.
    ///
    /// 1. Normalize the path, honoring the configured trailing-slash policy;
    ///    a normalization redirect short-circuits before matching.
    /// 2. If the matched host declares locales with `root_locale_redirect`
    ///    and the path is exactly `/`, redirect to `/<default_locale>/`.
    /// 3. Match `(host, method, path)`. No match invokes the not-found
    ///    responder.
    /// 4. Install the current-domain slot, resolve the route's plugin chain
    ///    and handler, and run [`PipelineRunner::run`]. The domain slot is
    ///    cleared on every exit path, including a handler panic, via
    ///    [`DomainGuard`]'s `Drop`.
    pub fn handle(&self, mut request: Request) -> Response {
        let normalized = match normalize_path(&request.path, &self.router.config) {
            Normalized::Path(path) => path,
            Normalized::Redirect { location, status } => {
                return Response::redirect(status, location);
            }
        };

        if let Some(response) = self.root_locale_redirect(&request.host, &normalized) {
            return response;
        }

        request.path = normalized;

        let Some(resolution) = self
            .router
            .match_request(&request.host, &request.method, &request.path)
        else {
            debug!(host = %request.host, path = %request.path, "no route matched");
            return (self.not_found)(&request);
        };

        let Some(handler) = self.handlers.get(&resolution.handler) else {
            warn!(handler = %resolution.handler, "matched route names an unregistered handler");
            return (self.server_error)(&request);
        };

        let _guard = DomainGuard::enter(DomainContext {
            host: resolution.domain.clone(),
            subdomain: resolution.subdomain.clone(),
            locale: resolution.locale.clone(),
        });

        let dispatched = PipelineRunner::run(&resolution.use_, handler.as_ref(), &request, &resolution.params);
        dispatched.response
    }

    fn root_locale_redirect(&self, host: &str, path: &str) -> Option<Response> {
        if path != "/" {
            return None;
        }
        let domain = self.router.domain_config(host)?;
        if !domain.root_locale_redirect {
            return None;
        }
        let default_locale = domain.default_locale?;
        Some(Response::redirect(302, format!("/{default_locale}/")))
    }
}
