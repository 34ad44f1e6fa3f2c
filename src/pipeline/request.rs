//! Request/response value types passed across the dispatch seam.
//!
//! These are transport-neutral: an adapter (CGI, hyper, actix, ...) builds a
//! [`Request`] from whatever it speaks and renders a [`Response`] back out.
//! The core never touches a socket.

use std::collections::HashMap;
use std::time::Duration;

use http::Method;
use serde_json::Value;

use crate::ids::RequestId;

/// Case-insensitive-by-convention header map. Adapters are responsible for
/// lower-casing keys on the way in; the core does no further normalization.
pub type HeaderMap = HashMap<String, String>;

/// Resolved route parameters, keyed by name. Last-write-wins for duplicate
/// names, matching [`crate::router::trie`]'s capture order.
pub type ParamMap = HashMap<String, String>;

/// An inbound request, already matched to a route.
#[derive(Debug, Clone)]
pub struct Request {
    pub request_id: RequestId,
    pub method: Method,
    pub host: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    /// Arbitrary per-request state plugins and handlers read/write (parsed
    /// session, authenticated user, CSRF token, ...). Avoids needing dynamic
    /// method injection on the request itself.
    pub attributes: HashMap<String, Value>,
}

impl Request {
    pub fn new(method: Method, host: impl Into<String>, path: impl Into<String>) -> Self {
        Request {
            request_id: RequestId::new(),
            method,
            host: host.into(),
            path: path.into(),
            query: HashMap::new(),
            headers: HashMap::new(),
            body: None,
            attributes: HashMap::new(),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }
}

/// An outbound response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Response {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Response {
            status,
            headers: HashMap::from([("content-type".to_string(), "text/plain".to_string())]),
            body: body.into().into_bytes(),
        }
    }

    pub fn json(status: u16, value: &Value) -> Self {
        Response {
            status,
            headers: HashMap::from([(
                "content-type".to_string(),
                "application/json".to_string(),
            )]),
            body: serde_json::to_vec(value).unwrap_or_default(),
        }
    }

    pub fn redirect(status: u16, location: impl Into<String>) -> Self {
        Response::new(status).with_header("Location", location)
    }

    pub fn not_found() -> Self {
        Response::text(404, "Not Found")
    }

    pub fn server_error() -> Self {
        Response::text(500, "Internal Server Error")
    }
}

/// The shape a handler's return value may take; [`crate::pipeline::runner`]
/// folds any of these into a [`Response`].
pub enum HandlerResult {
    Response(Response),
    Json(Value),
    Text(String),
    Triple {
        status: u16,
        headers: HeaderMap,
        body: Vec<u8>,
    },
}

impl From<HandlerResult> for Response {
    fn from(result: HandlerResult) -> Self {
        match result {
            HandlerResult::Response(r) => r,
            HandlerResult::Json(v) => Response::json(200, &v),
            HandlerResult::Text(s) => Response::text(200, s),
            HandlerResult::Triple {
                status,
                headers,
                body,
            } => {
                let mut r = Response::new(status);
                r.headers.extend(headers);
                r.body = body;
                r
            }
        }
    }
}

/// A registered route handler. Opaque to the router/compiler; looked up by
/// name at dispatch time and invoked synchronously in-line.
pub trait Handler: Send + Sync {
    fn call(&self, request: &Request, params: &ParamMap) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&Request, &ParamMap) -> HandlerResult + Send + Sync,
{
    fn call(&self, request: &Request, params: &ParamMap) -> HandlerResult {
        self(request, params)
    }
}

/// Outcome of running the full pipeline + handler for one request.
pub struct Dispatched {
    pub response: Response,
    pub latency: Duration,
}
