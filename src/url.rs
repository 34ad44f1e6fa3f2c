//! # URL Builder
//!
//! Resolves a named route (optionally through its locale-specific variant)
//! plus a parameter map into a path or absolute URL. See `SPEC_FULL.md` §4.3.

use std::collections::HashMap;

use crate::compiler::{RouteMeta, Segment};
use crate::domain::current_domain;
use crate::error::UrlError;
use crate::router::Router;

pub struct UrlBuilder<'a> {
    router: &'a Router,
}

impl<'a> UrlBuilder<'a> {
    pub fn new(router: &'a Router) -> Self {
        UrlBuilder { router }
    }

    /// Build just the path (+ query string) for `name`.
    ///
    /// `host` picks the host explicitly; if absent, the current request's
    /// matched host is used (see [`crate::domain`]); if that's also absent,
    /// the router's configured default host is used.
    pub fn path(
        &self,
        name: &str,
        host: Option<&str>,
        locale: Option<&str>,
        params: &HashMap<String, String>,
    ) -> Result<String, UrlError> {
        let resolved_host = host
            .map(str::to_string)
            .or_else(|| current_domain().map(|c| c.host))
            .or_else(|| self.router.default_host().map(str::to_string));

        let base_meta = self
            .router
            .lookup_name(name)
            .ok_or_else(|| UrlError::UnknownRoute { name: name.to_string() })?;

        // A route belongs to a localized family iff `localized` is set; the
        // *base* entry (looked up directly by its un-suffixed name) is the
        // one with no locale of its own yet; it still needs resolving to
        // a `name_locale` variant. A variant looked up directly by its
        // already-suffixed name carries its own `locale` and is used as-is.
        let meta = if base_meta.localized && base_meta.locale.is_none() {
            self.resolve_localized(name, &base_meta, resolved_host.as_deref(), locale)?
        } else {
            base_meta
        };

        build_from_segments(name, &meta.segments, params)
    }

    /// Build an absolute URL (`scheme://host/path`) for `name`.
    pub fn url(
        &self,
        name: &str,
        host: Option<&str>,
        locale: Option<&str>,
        protocol: Option<&str>,
        params: &HashMap<String, String>,
    ) -> Result<String, UrlError> {
        let resolved_host = host
            .map(str::to_string)
            .or_else(|| current_domain().map(|c| c.host))
            .or_else(|| self.router.default_host().map(str::to_string))
            .ok_or_else(|| UrlError::UnknownRoute { name: name.to_string() })?;
        let path = self.path(name, Some(&resolved_host), locale, params)?;
        let scheme = protocol.unwrap_or("https");
        Ok(format!("{scheme}://{resolved_host}{path}"))
    }

    fn resolve_localized(
        &self,
        name: &str,
        base_meta: &RouteMeta,
        host: Option<&str>,
        locale: Option<&str>,
    ) -> Result<std::sync::Arc<RouteMeta>, UrlError> {
        let default_locale = host
            .and_then(|h| self.router.domain_config(h))
            .and_then(|d| d.default_locale);
        let explicit = locale.is_some();
        let Some(effective_locale) = locale.map(str::to_string).or(default_locale) else {
            return Ok(std::sync::Arc::new(base_meta.clone()));
        };

        let locale_name = format!("{name}_{effective_locale}");
        match self.router.lookup_name(&locale_name) {
            Some(meta) => Ok(meta),
            // The default locale commonly has no distinct localized variant
            // (its path *is* the base path); only an explicitly requested
            // locale with no variant is an error.
            None if !explicit => Ok(std::sync::Arc::new(base_meta.clone())),
            None => Err(UrlError::UnknownLocale {
                route: name.to_string(),
                locale: effective_locale,
            }),
        }
    }
}

fn build_from_segments(
    name: &str,
    segments: &[Segment],
    params: &HashMap<String, String>,
) -> Result<String, UrlError> {
    let mut consumed: Vec<&str> = Vec::new();
    let mut path = String::from("/");

    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            path.push('/');
        }
        match segment {
            Segment::Literal(s) => path.push_str(s),
            Segment::Param(param) => {
                let value = params.get(param).ok_or_else(|| UrlError::MissingParam {
                    route: name.to_string(),
                    param: param.clone(),
                })?;
                path.push_str(&urlencoding::encode(value));
                consumed.push(param);
            }
            Segment::Wildcard(param) => {
                let value = params.get(param).ok_or_else(|| UrlError::MissingParam {
                    route: name.to_string(),
                    param: param.clone(),
                })?;
                path.push_str(value);
                consumed.push(param);
            }
        }
    }

    let mut query: Vec<(String, String)> = params
        .iter()
        .filter(|(k, _)| !consumed.iter().any(|c| c == k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    query.sort();

    if !query.is_empty() {
        let qs: Vec<String> = query
            .into_iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(&k), urlencoding::encode(&v)))
            .collect();
        path.push('?');
        path.push_str(&qs.join("&"));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::PluginRegistry;
    use crate::config::Config;
    use crate::route_def::{HostBuilder, RouteSpec, RouteTable};

    fn router() -> Router {
        let table = RouteTable::new().host(
            HostBuilder::new("example.com")
                .locales(["en", "fr"])
                .default_locale("en")
                .path("posts", |s| {
                    s.path(":id", |s2| s2.get(RouteSpec::new("posts#show").named("post_show")))
                })
                .path("about", |s| {
                    s.get(
                        RouteSpec::new("pages#about")
                            .named("about")
                            .localize("fr", "a-propos"),
                    )
                })
                .path("files", |s| {
                    s.get(RouteSpec::new("files#show").named("file_show"))
                })
                .build(),
        );
        let router = Router::new(Config::default());
        router.define(&table, &PluginRegistry::new()).unwrap();
        router
    }

    #[test]
    fn default_locale_with_no_registered_variant_falls_back_to_base_path() {
        let router = router();
        let builder = UrlBuilder::new(&router);
        let mut params = HashMap::new();
        params.insert("extra".to_string(), "1".to_string());
        let path = builder.path("about", Some("example.com"), None, &params).unwrap();
        assert_eq!(path, "/about?extra=1");
    }

    #[test]
    fn missing_param_is_an_error() {
        let router = router();
        let builder = UrlBuilder::new(&router);
        let err = builder
            .path("post_show", Some("example.com"), None, &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, UrlError::MissingParam { .. }));
    }

    #[test]
    fn param_is_percent_encoded_and_leftover_params_become_query() {
        let router = router();
        let builder = UrlBuilder::new(&router);
        let mut params = HashMap::new();
        params.insert("id".to_string(), "a b".to_string());
        params.insert("page".to_string(), "2".to_string());
        let path = builder.path("post_show", Some("example.com"), None, &params).unwrap();
        assert_eq!(path, "/posts/a%20b?page=2");
    }

    #[test]
    fn unknown_route_is_an_error() {
        let router = router();
        let builder = UrlBuilder::new(&router);
        let err = builder
            .path("nope", Some("example.com"), None, &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, UrlError::UnknownRoute { .. }));
    }

    #[test]
    fn locale_selects_variant_path() {
        let router = router();
        let builder = UrlBuilder::new(&router);
        let path = builder
            .path("about", Some("example.com"), Some("fr"), &HashMap::new())
            .unwrap();
        assert_eq!(path, "/fr/a-propos");
    }

    #[test]
    fn generated_path_renders_literals_in_canonical_lowercase() {
        let table = RouteTable::new().host(
            HostBuilder::new("example.com")
                .path("Posts", |s| {
                    s.path(":id", |s2| s2.get(RouteSpec::new("posts#show").named("mixed_case_post")))
                })
                .build(),
        );
        let router = Router::new(Config::default());
        router.define(&table, &PluginRegistry::new()).unwrap();
        let builder = UrlBuilder::new(&router);
        let mut params = HashMap::new();
        params.insert("id".to_string(), "7".to_string());
        let path = builder
            .path("mixed_case_post", Some("example.com"), None, &params)
            .unwrap();
        assert_eq!(path, "/posts/7");
    }

    #[test]
    fn url_builds_absolute_form() {
        let router = router();
        let builder = UrlBuilder::new(&router);
        let url = builder
            .url("file_show", Some("example.com"), None, None, &HashMap::new())
            .unwrap();
        assert!(url.starts_with("https://example.com/"));
    }
}
