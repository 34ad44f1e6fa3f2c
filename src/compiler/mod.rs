//! # Compiler Module
//!
//! Turns a [`crate::route_def::RouteTable`] into the tries, domain configs,
//! and name table the [`crate::router::Router`] matches against and the
//! [`crate::url::UrlBuilder`] generates from. See `SPEC_FULL.md` §4.1.

pub mod compile;
pub mod meta;
pub mod registry;

pub use compile::{compile, CompiledRoutes, DomainConfig, HostTables};
pub use meta::{RouteMeta, Segment};
pub use registry::PluginRegistry;
