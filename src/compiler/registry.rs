//! Plugin registry: symbolic name -> one or more plugin instances.
//!
//! A name may resolve to more than one object so composite plugins, a CSRF
//! pair of generator + protection for instance, can be installed under a
//! single `use` identifier.

use std::collections::HashMap;
use std::sync::Arc;

use crate::pipeline::Plugin;

#[derive(Clone, Default)]
pub struct PluginRegistry {
    entries: HashMap<String, Vec<Arc<dyn Plugin>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single plugin under `name`, replacing any prior
    /// registration of the same name.
    pub fn register(&mut self, name: impl Into<String>, plugin: Arc<dyn Plugin>) {
        self.entries.insert(name.into(), vec![plugin]);
    }

    /// Register a composite plugin (several objects under one name), e.g.
    /// `registry.register_many("csrf", vec![generator, protection])`.
    pub fn register_many(&mut self, name: impl Into<String>, plugins: Vec<Arc<dyn Plugin>>) {
        self.entries.insert(name.into(), plugins);
    }

    /// Resolve a `use` identifier to its registered plugin list. Returns
    /// `None` if `name` was never registered.
    pub fn resolve(&self, name: &str) -> Option<&[Arc<dyn Plugin>]> {
        self.entries.get(name).map(Vec::as_slice)
    }
}
