//! Bearer-token authentication plugin.
//!
//! A basic example of the [`Plugin`] protocol's request phase. Not suitable
//! for production use; concrete plugins (auth, CORS, CSRF, rate limiting,
//! ...) are out of this crate's scope beyond demonstrating the protocol.
//! Real deployments should bring their own.

use crate::pipeline::{Decision, Plugin, Request, Response};

/// Checks the `authorization` header for an exact match against a configured
/// token. Returns 401 immediately on mismatch or absence.
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    pub fn new(token: impl Into<String>) -> Self {
        BearerAuth { token: token.into() }
    }
}

impl Plugin for BearerAuth {
    fn call(&self, request: &Request) -> Decision {
        match request.headers.get("authorization") {
            Some(h) if h == &format!("Bearer {}", self.token) => Decision::Continue,
            _ => Decision::ShortCircuit(Response::json(401, &serde_json::json!({ "error": "unauthorized" }))),
        }
    }

    fn name(&self) -> &'static str {
        "BearerAuth"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn request_with_auth(header: Option<&str>) -> Request {
        let mut req = Request::new(Method::GET, "example.com", "/");
        if let Some(h) = header {
            req.headers.insert("authorization".to_string(), h.to_string());
        }
        req
    }

    #[test]
    fn matching_token_continues() {
        let plugin = BearerAuth::new("secret");
        let req = request_with_auth(Some("Bearer secret"));
        assert!(matches!(plugin.call(&req), Decision::Continue));
    }

    #[test]
    fn missing_header_short_circuits_with_401() {
        let plugin = BearerAuth::new("secret");
        let req = request_with_auth(None);
        match plugin.call(&req) {
            Decision::ShortCircuit(resp) => assert_eq!(resp.status, 401),
            Decision::Continue => panic!("expected short-circuit"),
        }
    }

    #[test]
    fn wrong_token_short_circuits_with_401() {
        let plugin = BearerAuth::new("secret");
        let req = request_with_auth(Some("Bearer wrong"));
        match plugin.call(&req) {
            Decision::ShortCircuit(resp) => assert_eq!(resp.status, 401),
            Decision::Continue => panic!("expected short-circuit"),
        }
    }
}
