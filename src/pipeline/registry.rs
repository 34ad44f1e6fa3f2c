//! Handler registry: name -> callable.

use std::collections::HashMap;
use std::sync::Arc;

use crate::pipeline::request::Handler;

#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn Handler>) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::request::{HandlerResult, ParamMap, Request};

    struct Echo;
    impl Handler for Echo {
        fn call(&self, _request: &Request, _params: &ParamMap) -> HandlerResult {
            HandlerResult::Text("echo".to_string())
        }
    }

    #[test]
    fn register_then_get_round_trips() {
        let mut registry = HandlerRegistry::new();
        registry.register("echo", Arc::new(Echo));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("missing").is_none());
    }
}
