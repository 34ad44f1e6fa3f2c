//! Two-phase pipeline execution.
//!
//! Request phase runs plugins in forward (registration) order until one
//! short-circuits or the list is exhausted, then the handler runs. Response
//! phase then runs *every* plugin's `call_response` in forward order,
//! regardless of where (or whether) the request phase short-circuited,
//! the fixed design this crate standardizes on (see `DESIGN.md`).

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, warn};

use crate::pipeline::plugin::{Decision, Plugin};
use crate::pipeline::request::{Dispatched, Handler, ParamMap, Request, Response};

/// Runs the resolved plugin chain and handler for a single request.
pub struct PipelineRunner;

impl PipelineRunner {
    /// Execute `plugins` around `handler` for `request`/`params`.
    ///
    /// `handler` is resolved by the caller (the engine) from the route's
    /// `to` identifier; a missing handler is the caller's concern, not this
    /// runner's.
    pub fn run(
        plugins: &[Arc<dyn Plugin>],
        handler: &dyn Handler,
        request: &Request,
        params: &ParamMap,
    ) -> Dispatched {
        let start = Instant::now();

        let mut short_circuited: Option<Response> = None;
        for plugin in plugins {
            match plugin.call(request) {
                Decision::Continue => {}
                Decision::ShortCircuit(resp) => {
                    debug!(
                        plugin = plugin.name(),
                        status = resp.status,
                        "plugin short-circuited request phase"
                    );
                    short_circuited = Some(resp);
                    break;
                }
            }
        }

        let mut response = match short_circuited {
            Some(resp) => resp,
            None => {
                let outcome = catch_unwind(AssertUnwindSafe(|| handler.call(request, params)));
                match outcome {
                    Ok(result) => result.into(),
                    Err(panic) => {
                        let message = panic
                            .downcast_ref::<&str>()
                            .map(|s| s.to_string())
                            .or_else(|| panic.downcast_ref::<String>().cloned())
                            .unwrap_or_else(|| "handler panicked".to_string());
                        error!(request_id = %request.request_id, error = %message, "handler panicked");
                        Response::server_error()
                    }
                }
            }
        };

        let latency = start.elapsed();
        for plugin in plugins {
            plugin.call_response(request, &mut response, latency);
        }

        if latency.as_millis() > 250 {
            warn!(request_id = %request.request_id, latency_ms = latency.as_millis(), "slow request");
        }

        Dispatched { response, latency }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::request::HandlerResult;
    use std::time::Duration;

    struct TagPlugin(&'static str);
    impl Plugin for TagPlugin {
        fn call_response(&self, _req: &Request, res: &mut Response, _latency: Duration) {
            res.headers.insert(self.0.to_string(), "1".to_string());
        }
    }

    struct ShortCircuitPlugin;
    impl Plugin for ShortCircuitPlugin {
        fn call(&self, _req: &Request) -> Decision {
            Decision::ShortCircuit(Response::text(401, "nope"))
        }
    }

    struct PanicHandler;
    impl Handler for PanicHandler {
        fn call(&self, _request: &Request, _params: &ParamMap) -> HandlerResult {
            panic!("boom");
        }
    }

    struct OkHandler;
    impl Handler for OkHandler {
        fn call(&self, _request: &Request, _params: &ParamMap) -> HandlerResult {
            HandlerResult::Text("ok".to_string())
        }
    }

    #[test]
    fn response_phase_runs_for_all_plugins_even_after_short_circuit() {
        let plugins: Vec<Arc<dyn Plugin>> = vec![
            Arc::new(TagPlugin("a")),
            Arc::new(ShortCircuitPlugin),
            Arc::new(TagPlugin("b")),
        ];
        let req = Request::new(http::Method::GET, "h", "/");
        let params = ParamMap::new();
        let dispatched = PipelineRunner::run(&plugins, &OkHandler, &req, &params);

        assert_eq!(dispatched.response.status, 401);
        assert_eq!(dispatched.response.headers.get("a").map(String::as_str), Some("1"));
        assert_eq!(dispatched.response.headers.get("b").map(String::as_str), Some("1"));
    }

    #[test]
    fn handler_panic_is_caught_and_becomes_500() {
        let plugins: Vec<Arc<dyn Plugin>> = Vec::new();
        let req = Request::new(http::Method::GET, "h", "/");
        let params = ParamMap::new();
        let dispatched = PipelineRunner::run(&plugins, &PanicHandler, &req, &params);
        assert_eq!(dispatched.response.status, 500);
    }

    #[test]
    fn no_short_circuit_runs_handler_and_all_response_hooks() {
        let plugins: Vec<Arc<dyn Plugin>> = vec![Arc::new(TagPlugin("a"))];
        let req = Request::new(http::Method::GET, "h", "/");
        let params = ParamMap::new();
        let dispatched = PipelineRunner::run(&plugins, &OkHandler, &req, &params);
        assert_eq!(dispatched.response.status, 200);
        assert_eq!(dispatched.response.body, b"ok");
        assert_eq!(dispatched.response.headers.get("a").map(String::as_str), Some("1"));
    }
}
