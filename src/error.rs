//! Error taxonomy for route compilation and URL generation.
//!
//! Matching failures and constraint rejections are not represented here; they
//! are not errors, just an empty `Option` (see [`crate::router::Router::match_request`]).

use std::fmt;

/// Failure compiling a route table with [`crate::compiler::compile`].
///
/// All variants are fatal: a `define()` call either fully replaces the route
/// tables or leaves the previous ones untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Two routes were registered under the same `name`.
    DuplicateName {
        name: String,
        first_domain: String,
        first_pattern: String,
        second_domain: String,
        second_pattern: String,
    },
    /// A `localized` key referenced a locale the host never declared.
    UnknownLocale { route: String, locale: String },
    /// A host's `default_locale` was not present in its own `locales` list.
    DefaultLocaleNotDeclared { domain: String, default: String },
    /// A path fragment or parameter name was malformed (e.g. `:` with no name).
    MalformedSegment { domain: String, segment: String },
    /// A `use` entry named a plugin identifier the registry has never seen.
    UnknownPlugin { domain: String, name: String },
    /// Two segments of the same kind at the same trie position disagree on
    /// parameter name (e.g. `:id` vs `:user_id` would be fine as siblings,
    /// but a wildcard child can only ever have one name per node).
    ConflictingWildcardName {
        domain: String,
        existing: String,
        new: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::DuplicateName {
                name,
                first_domain,
                first_pattern,
                second_domain,
                second_pattern,
            } => write!(
                f,
                "route name '{name}' registered twice (first on '{first_domain}' at '{first_pattern}', again on '{second_domain}' at '{second_pattern}')"
            ),
            ConfigError::UnknownLocale { route, locale } => write!(
                f,
                "route '{route}' declares localized variant '{locale}' that its host never lists in `locales`"
            ),
            ConfigError::DefaultLocaleNotDeclared { domain, default } => write!(
                f,
                "host '{domain}' sets default_locale '{default}' which is absent from its own locales list"
            ),
            ConfigError::MalformedSegment { domain, segment } => {
                write!(f, "host '{domain}': malformed path segment '{segment}'")
            }
            ConfigError::UnknownPlugin { domain, name } => write!(
                f,
                "host '{domain}': `use` references unregistered plugin '{name}'"
            ),
            ConfigError::ConflictingWildcardName {
                domain,
                existing,
                new,
            } => write!(
                f,
                "host '{domain}': wildcard/parameter child already bound to name '{existing}', cannot rebind to '{new}' at the same position"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failure building a URL with [`crate::url::UrlBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    /// No route (base or localized) is registered under this name, on this
    /// host or on the `*` fallback host.
    UnknownRoute { name: String },
    /// A `:name`/`*name` segment in the resolved route had no corresponding
    /// entry in the caller-supplied parameter map.
    MissingParam { route: String, param: String },
    /// The route is `localized` but the requested locale is not one of the
    /// host's declared `locales`.
    UnknownLocale { route: String, locale: String },
}

impl fmt::Display for UrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlError::UnknownRoute { name } => write!(f, "no route named '{name}'"),
            UrlError::MissingParam { route, param } => write!(
                f,
                "route '{route}' requires parameter '{param}' which was not supplied"
            ),
            UrlError::UnknownLocale { route, locale } => write!(
                f,
                "route '{route}' has no '{locale}' localized variant"
            ),
        }
    }
}

impl std::error::Error for UrlError {}
