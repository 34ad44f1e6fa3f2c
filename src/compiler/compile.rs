//! Route compiler: walks a [`RouteTable`] and produces the tries, domain
//! configs, and name table a [`crate::router::Router`] matches against.
//!
//! The output additionally carries per-host locale config and a resolved
//! (not just named) plugin chain per route.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use tracing::{info, warn};

use crate::compiler::meta::{RouteMeta, Segment};
use crate::compiler::registry::PluginRegistry;
use crate::error::ConfigError;
use crate::pipeline::Plugin;
use crate::route_def::{PluginRef, RouteSpec, RouteTable, ScopeNode};
use crate::router::trie::Trie;

/// Per-host locale configuration.
#[derive(Debug, Clone, Default)]
pub struct DomainConfig {
    pub locales: Option<Vec<String>>,
    pub default_locale: Option<String>,
    pub root_locale_redirect: bool,
}

/// One host's compiled trie plus its locale configuration.
#[derive(Default)]
pub struct HostTables {
    pub trie: Trie,
    pub domain: DomainConfig,
}

/// The full output of a `define()` call, published atomically behind an
/// `ArcSwap` by [`crate::router::Router`].
#[derive(Default)]
pub struct CompiledRoutes {
    pub exact: HashMap<String, HostTables>,
    /// `(base_suffix, tables)` in registration order, first dotted-suffix
    /// match wins.
    pub wildcard: Vec<(String, HostTables)>,
    pub global: Option<HostTables>,
    /// name (or `name_locale`) -> metadata, across all hosts.
    pub names: HashMap<String, Arc<RouteMeta>>,
}

pub fn compile(table: &RouteTable, registry: &PluginRegistry) -> Result<CompiledRoutes, ConfigError> {
    let mut compiled = CompiledRoutes::default();

    for host in &table.hosts {
        let domain_key = host.pattern.to_lowercase();
        let domain = DomainConfig {
            locales: host.locales.clone(),
            default_locale: host.default_locale.clone(),
            root_locale_redirect: host.root_locale_redirect,
        };

        if let (Some(locales), Some(default)) = (&domain.locales, &domain.default_locale) {
            if !locales.contains(default) {
                return Err(ConfigError::DefaultLocaleNotDeclared {
                    domain: domain_key.clone(),
                    default: default.clone(),
                });
            }
        }

        let mut tables = HostTables {
            trie: Trie::new(),
            domain,
        };

        let host_inherited = resolve_use(&host.use_, registry, &domain_key)?;
        let mut path_stack: Vec<Segment> = Vec::new();
        walk(
            &host.children,
            &domain_key,
            &mut path_stack,
            &host_inherited,
            registry,
            &mut tables,
            &mut compiled.names,
        )?;

        if let Some(base) = domain_key.strip_prefix("*.") {
            compiled.wildcard.push((base.to_string(), tables));
        } else if domain_key == "*" {
            compiled.global = Some(tables);
        } else {
            compiled.exact.insert(domain_key, tables);
        }
    }

    info!(
        exact_hosts = compiled.exact.len(),
        wildcard_hosts = compiled.wildcard.len(),
        has_global = compiled.global.is_some(),
        named_routes = compiled.names.len(),
        "route table compiled"
    );

    Ok(compiled)
}

#[allow(clippy::too_many_arguments)]
fn walk(
    children: &[ScopeNode],
    domain: &str,
    path_stack: &mut Vec<Segment>,
    inherited: &[Arc<dyn Plugin>],
    registry: &PluginRegistry,
    tables: &mut HostTables,
    names: &mut HashMap<String, Arc<RouteMeta>>,
) -> Result<(), ConfigError> {
    for child in children {
        match child {
            ScopeNode::Scope {
                fragment,
                use_,
                reset_use,
                children,
            } => {
                let added = parse_segments(domain, fragment)?;
                let depth = added.len();
                path_stack.extend(added);

                let scope_use = resolve_use(use_, registry, domain)?;
                let merged = if *reset_use {
                    scope_use
                } else {
                    merge_use(inherited, &scope_use)
                };

                walk(children, domain, path_stack, &merged, registry, tables, names)?;
                path_stack.truncate(path_stack.len() - depth);
            }
            ScopeNode::Method { method, spec } => {
                register_route(domain, method.clone(), path_stack, spec, inherited, registry, tables, names)?;
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn register_route(
    domain: &str,
    method: http::Method,
    path_stack: &[Segment],
    spec: &RouteSpec,
    inherited: &[Arc<dyn Plugin>],
    registry: &PluginRegistry,
    tables: &mut HostTables,
    names: &mut HashMap<String, Arc<RouteMeta>>,
) -> Result<(), ConfigError> {
    let route_use = resolve_use(&spec.use_, registry, domain)?;
    let effective_use = merge_use(inherited, &route_use);

    let constraints = compile_constraints(domain, &spec.constraints)?;
    let param_names = param_names_of(path_stack);

    if !spec.localized.is_empty() {
        let name = spec.as_.clone().ok_or_else(|| ConfigError::MalformedSegment {
            domain: domain.to_string(),
            segment: "localized route requires `as` name".to_string(),
        })?;

        if let Some(locales) = &tables.domain.locales {
            for locale in locales {
                if !spec.localized.contains_key(locale) {
                    warn!(route = %name, locale = %locale, "host declares locale with no localized variant for this route");
                }
            }
        }

        let base_meta = Arc::new(RouteMeta {
            domain: domain.to_string(),
            name: name.clone(),
            handler: spec.to.clone(),
            use_: effective_use.clone(),
            method: method.clone(),
            segments: path_stack.to_vec(),
            param_names: param_names.clone(),
            constraints: constraints.clone(),
            locale: None,
            localized: true,
        });
        insert_name(names, name.clone(), domain, base_meta)?;

        for (locale, localized_path) in &spec.localized {
            if let Some(locales) = &tables.domain.locales {
                if !locales.contains(locale) {
                    return Err(ConfigError::UnknownLocale {
                        route: name.clone(),
                        locale: locale.clone(),
                    });
                }
            } else {
                return Err(ConfigError::UnknownLocale {
                    route: name.clone(),
                    locale: locale.clone(),
                });
            }

            let mut full_segments = vec![Segment::Literal(locale.to_lowercase())];
            full_segments.extend(parse_segments(domain, localized_path)?);
            let locale_param_names = param_names_of(&full_segments);
            let locale_name = format!("{name}_{locale}");

            let meta = Arc::new(RouteMeta {
                domain: domain.to_string(),
                name: locale_name.clone(),
                handler: spec.to.clone(),
                use_: effective_use.clone(),
                method: method.clone(),
                segments: full_segments.clone(),
                param_names: locale_param_names,
                constraints: constraints.clone(),
                locale: Some(locale.clone()),
                localized: true,
            });
            insert_into_trie(&mut tables.trie, domain, &full_segments, method.clone(), Arc::clone(&meta))?;
            insert_name(names, locale_name, domain, meta)?;
        }
        return Ok(());
    }

    let meta = Arc::new(RouteMeta {
        domain: domain.to_string(),
        name: spec.as_.clone().unwrap_or_default(),
        handler: spec.to.clone(),
        use_: effective_use,
        method: method.clone(),
        segments: path_stack.to_vec(),
        param_names,
        constraints,
        locale: None,
        localized: false,
    });

    insert_into_trie(&mut tables.trie, domain, path_stack, method, Arc::clone(&meta))?;

    if let Some(name) = &spec.as_ {
        insert_name(names, name.clone(), domain, meta)?;
    }

    Ok(())
}

fn insert_into_trie(
    trie: &mut Trie,
    domain: &str,
    segments: &[Segment],
    method: http::Method,
    meta: Arc<RouteMeta>,
) -> Result<(), ConfigError> {
    trie.insert(segments, method, meta).map_err(|conflict| ConfigError::ConflictingWildcardName {
        domain: domain.to_string(),
        existing: conflict.existing,
        new: conflict.new,
    })
}

fn insert_name(
    names: &mut HashMap<String, Arc<RouteMeta>>,
    name: String,
    domain: &str,
    meta: Arc<RouteMeta>,
) -> Result<(), ConfigError> {
    if let Some(existing) = names.get(&name) {
        if existing.domain != domain || existing.method != meta.method || existing.segments != meta.segments {
            return Err(ConfigError::DuplicateName {
                name,
                first_domain: existing.domain.clone(),
                first_pattern: existing.pattern(),
                second_domain: domain.to_string(),
                second_pattern: meta.pattern(),
            });
        }
    }
    names.insert(name, meta);
    Ok(())
}

fn param_names_of(segments: &[Segment]) -> Vec<String> {
    segments
        .iter()
        .filter_map(|s| match s {
            Segment::Param(name) | Segment::Wildcard(name) => Some(name.clone()),
            Segment::Literal(_) => None,
        })
        .collect()
}

fn compile_constraints(
    domain: &str,
    constraints: &HashMap<String, String>,
) -> Result<HashMap<String, Regex>, ConfigError> {
    let mut out = HashMap::with_capacity(constraints.len());
    for (param, pattern) in constraints {
        let regex = Regex::new(pattern).map_err(|_| ConfigError::MalformedSegment {
            domain: domain.to_string(),
            segment: format!(":{param} constraint '{pattern}'"),
        })?;
        out.insert(param.clone(), regex);
    }
    Ok(out)
}

fn parse_segments(domain: &str, fragment: &str) -> Result<Vec<Segment>, ConfigError> {
    fragment
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|raw| {
            if let Some(name) = raw.strip_prefix(':') {
                if name.is_empty() {
                    return Err(ConfigError::MalformedSegment {
                        domain: domain.to_string(),
                        segment: raw.to_string(),
                    });
                }
                Ok(Segment::Param(name.to_string()))
            } else if let Some(name) = raw.strip_prefix('*') {
                let name = if name.is_empty() { "path" } else { name };
                Ok(Segment::Wildcard(name.to_string()))
            } else {
                // Literals match case-insensitively; store lowercased so the
                // trie's literal lookup (also lowercasing the incoming
                // segment) is a straight hash comparison. Captured parameter
                // values are never run through this path.
                Ok(Segment::Literal(raw.to_lowercase()))
            }
        })
        .collect()
}

fn resolve_use(
    refs: &[PluginRef],
    registry: &PluginRegistry,
    domain: &str,
) -> Result<Vec<Arc<dyn Plugin>>, ConfigError> {
    let mut out = Vec::new();
    for plugin_ref in refs {
        match plugin_ref {
            PluginRef::Instance(p) => out.push(Arc::clone(p)),
            PluginRef::Name(name) => {
                let resolved = registry.resolve(name).ok_or_else(|| ConfigError::UnknownPlugin {
                    domain: domain.to_string(),
                    name: name.clone(),
                })?;
                out.extend(resolved.iter().cloned());
            }
        }
    }
    Ok(out)
}

/// Concatenate `base` and `additional`, dropping later entries that are the
/// same plugin instance (`Arc::ptr_eq`) as one already present, so a scope
/// can re-`use` a parent-inherited plugin without duplicating it in the
/// final chain.
fn merge_use(base: &[Arc<dyn Plugin>], additional: &[Arc<dyn Plugin>]) -> Vec<Arc<dyn Plugin>> {
    let mut out: Vec<Arc<dyn Plugin>> = base.to_vec();
    for candidate in additional {
        if !out.iter().any(|existing| Arc::ptr_eq(existing, candidate)) {
            out.push(Arc::clone(candidate));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Decision, Request};
    use crate::route_def::{HostBuilder, RouteTable};

    struct Dummy;
    impl Plugin for Dummy {
        fn call(&self, _request: &Request) -> Decision {
            Decision::Continue
        }
    }

    #[test]
    fn duplicate_name_on_same_host_fails() {
        let table = RouteTable::new().host(
            HostBuilder::new("example.com")
                .get(RouteSpec::new("a#a").named("dup"))
                .path("other", |s| s.get(RouteSpec::new("b#b").named("dup")))
                .build(),
        );
        let registry = PluginRegistry::new();
        let err = compile(&table, &registry).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName { .. }));
    }

    #[test]
    fn localized_route_without_locales_declared_is_unknown_locale_error() {
        let table = RouteTable::new().host(
            HostBuilder::new("example.com")
                .get(
                    RouteSpec::new("pages#about")
                        .named("about")
                        .localize("fr", "a-propos"),
                )
                .build(),
        );
        let registry = PluginRegistry::new();
        let err = compile(&table, &registry).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLocale { .. }));
    }

    #[test]
    fn default_locale_must_be_declared() {
        let table = RouteTable::new().host(
            HostBuilder::new("example.com")
                .locales(["en", "fr"])
                .default_locale("de")
                .build(),
        );
        let registry = PluginRegistry::new();
        let err = compile(&table, &registry).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultLocaleNotDeclared { .. }));
    }

    #[test]
    fn localized_route_compiles_base_and_variant_names() {
        let table = RouteTable::new().host(
            HostBuilder::new("example.com")
                .locales(["en", "fr"])
                .default_locale("en")
                .get(
                    RouteSpec::new("pages#about")
                        .named("about")
                        .localize("fr", "a-propos"),
                )
                .build(),
        );
        let registry = PluginRegistry::new();
        let compiled = compile(&table, &registry).unwrap();
        assert!(compiled.names.contains_key("about"));
        assert!(compiled.names.contains_key("about_fr"));
        let host = compiled.exact.get("example.com").unwrap();
        assert!(host.trie.search(&http::Method::GET, "/fr/a-propos").is_some());
    }

    #[test]
    fn conflicting_param_name_at_same_trie_position_fails_define() {
        let table = RouteTable::new().host(
            HostBuilder::new("example.com")
                .path("team", |s| {
                    s.path(":id", |s2| s2.get(RouteSpec::new("team#show").named("team_show")))
                })
                .path("team", |s| {
                    s.path(":team_id", |s2| {
                        s2.post(RouteSpec::new("team#update").named("team_update"))
                    })
                })
                .build(),
        );
        let registry = PluginRegistry::new();
        let err = compile(&table, &registry).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingWildcardName { .. }));
    }

    #[test]
    fn nested_use_inherits_and_dedupes_parent_plugin() {
        let shared = Arc::new(Dummy);
        let table = RouteTable::new().host(
            HostBuilder::new("example.com")
                .uses(PluginRef::instance(shared.clone()))
                .path("admin", |s| {
                    s.uses(PluginRef::instance(shared.clone()))
                        .get(RouteSpec::new("admin#index").named("admin_index"))
                })
                .build(),
        );
        let registry = PluginRegistry::new();
        let compiled = compile(&table, &registry).unwrap();
        let meta = compiled.names.get("admin_index").unwrap();
        assert_eq!(meta.use_.len(), 1, "duplicate instance must be deduped");
    }

    #[test]
    fn clear_use_drops_the_inherited_chain_for_that_scope_only() {
        let parent_only = Arc::new(Dummy);
        let scope_only = Arc::new(Dummy);
        let table = RouteTable::new().host(
            HostBuilder::new("example.com")
                .uses(PluginRef::instance(parent_only.clone()))
                .path("public", |s| {
                    s.get(RouteSpec::new("pages#public").named("public_index"))
                })
                .path("reset", |s| {
                    s.clear_use()
                        .uses(PluginRef::instance(scope_only.clone()))
                        .get(RouteSpec::new("pages#reset").named("reset_index"))
                })
                .build(),
        );
        let registry = PluginRegistry::new();
        let compiled = compile(&table, &registry).unwrap();

        let public = compiled.names.get("public_index").unwrap();
        assert_eq!(public.use_.len(), 1, "sibling scope still inherits the host's use chain");

        let reset = compiled.names.get("reset_index").unwrap();
        assert_eq!(reset.use_.len(), 1, "reset scope keeps its own use_ entry");
        let scope_only_dyn: Arc<dyn Plugin> = scope_only;
        assert!(
            Arc::ptr_eq(&reset.use_[0], &scope_only_dyn),
            "reset scope must not carry the parent's inherited plugin"
        );
    }
}
