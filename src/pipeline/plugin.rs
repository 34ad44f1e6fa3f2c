//! Two-phase plugin protocol.
//!
//! A plugin inspects (and may short-circuit) the request phase via `call`,
//! and unconditionally observes the response phase via `call_response`,
//! using the request/response-phase vocabulary used throughout this router.

use std::time::Duration;

use crate::pipeline::request::{Request, Response};

/// What a plugin's request-phase hook decided.
pub enum Decision {
    /// Continue to the next plugin (or the handler, if this was the last one).
    Continue,
    /// Stop advancing the request phase and skip the handler. The response
    /// phase still runs for every plugin whose `call_response` is non-default,
    /// in forward order, regardless of this short-circuit.
    ShortCircuit(Response),
}

/// A pipeline plugin. Implementors are free to hold their own interior
/// mutability (counters, caches, ...) but must be safe to invoke from
/// concurrent requests (`Send + Sync`).
pub trait Plugin: Send + Sync {
    /// Request phase. Return [`Decision::ShortCircuit`] to answer immediately
    /// without invoking the handler or any later plugin's `call`.
    fn call(&self, _request: &Request) -> Decision {
        Decision::Continue
    }

    /// Response phase. Runs after the handler (or after a short-circuit),
    /// in forward (registration) order, and may mutate the response in place.
    fn call_response(&self, _request: &Request, _response: &mut Response, _latency: Duration) {}

    /// Human-readable name, used in plugin-ordering diagnostics. Defaults to
    /// the implementor's type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
