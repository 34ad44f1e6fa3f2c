//! Double-submit-cookie CSRF protection, a composite two-phase plugin pair.
//!
//! [`CsrfGenerator`] stamps every response with a fresh token (as both a
//! cookie and a custom header); [`CsrfProtection`] rejects any state-changing
//! request whose `x-csrf-token` header doesn't echo its `csrf_token` cookie.
//! Register both under one name with
//! [`crate::compiler::PluginRegistry::register_many`] so a single `use`
//! identifier resolves to the pair, e.g. `registry.register_many("csrf",
//! vec![Arc::new(CsrfGenerator), Arc::new(CsrfProtection)])`. Like
//! [`crate::plugins::auth::BearerAuth`], this exists to demonstrate the
//! composite-registration pattern, not as a hardened implementation.

use http::Method;

use crate::pipeline::{Decision, Plugin, Request, Response};

const COOKIE_NAME: &str = "csrf_token";
const HEADER_NAME: &str = "x-csrf-token";

fn is_state_changing(method: &Method) -> bool {
    matches!(method, &Method::POST | &Method::PUT | &Method::PATCH | &Method::DELETE)
}

fn cookie_value<'a>(headers: &'a std::collections::HashMap<String, String>, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get("cookie")?;
    cookie_header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

/// Stamps a fresh token on every response that doesn't already carry a
/// `set-cookie` for [`COOKIE_NAME`].
pub struct CsrfGenerator;

impl Plugin for CsrfGenerator {
    fn call_response(&self, _request: &Request, response: &mut Response, _latency: std::time::Duration) {
        if response.headers.contains_key("set-cookie") {
            return;
        }
        let token = crate::ids::RequestId::new().to_string();
        response
            .headers
            .insert("set-cookie".to_string(), format!("{COOKIE_NAME}={token}; Path=/; SameSite=Strict"));
        response.headers.insert(HEADER_NAME.to_string(), token);
    }

    fn name(&self) -> &'static str {
        "CsrfGenerator"
    }
}

/// Rejects state-changing requests whose `x-csrf-token` header does not
/// match their `csrf_token` cookie.
pub struct CsrfProtection;

impl Plugin for CsrfProtection {
    fn call(&self, request: &Request) -> Decision {
        if !is_state_changing(&request.method) {
            return Decision::Continue;
        }
        let header_token = request.headers.get(HEADER_NAME);
        let cookie_token = cookie_value(&request.headers, COOKIE_NAME);
        match (header_token, cookie_token) {
            (Some(h), Some(c)) if h == c => Decision::Continue,
            _ => Decision::ShortCircuit(Response::json(403, &serde_json::json!({ "error": "csrf_mismatch" }))),
        }
    }

    fn name(&self) -> &'static str {
        "CsrfProtection"
    }
}
