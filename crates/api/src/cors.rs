//! CORS gate.
//!
//! Requests whose `Origin` is not on the allow-list are refused before any
//! other middleware or handler runs. Allowed requests get a fixed set of CORS
//! response headers; browser preflights are answered directly.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

pub const INVALID_ORIGIN: &str = "Invalid Origin";

pub const ALLOW_METHODS: &str = "GET, POST, PUT, PATCH, DELETE";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Exact-match list of origins allowed to call the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    /// Parse a comma-separated list.
    ///
    /// Entries are not trimmed. An empty input yields a single empty entry, so
    /// requests without an `Origin` header are accepted when nothing is configured.
    pub fn parse(raw: &str) -> Self {
        Self(raw.split(',').map(str::to_string).collect())
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.allows_bytes(origin.as_bytes())
    }

    /// Byte-exact membership test, for header values that need not be text.
    pub fn allows_bytes(&self, origin: &[u8]) -> bool {
        self.0.iter().any(|o| o.as_bytes() == origin)
    }
}

pub async fn cors_middleware(
    State(origins): State<Arc<AllowedOrigins>>,
    req: Request,
    next: Next,
) -> Response {
    // Only an absent header counts as the empty origin.
    let origin = req.headers().get(ORIGIN).cloned();
    let origin_bytes = origin.as_ref().map(HeaderValue::as_bytes).unwrap_or_default();

    if !origins.allows_bytes(origin_bytes) {
        tracing::debug!(origin = ?origin, "rejecting request from disallowed origin");
        return (StatusCode::UNAUTHORIZED, INVALID_ORIGIN).into_response();
    }

    let origin = origin.unwrap_or_else(|| HeaderValue::from_static(""));

    let is_preflight =
        req.method() == Method::OPTIONS && req.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD);
    if is_preflight {
        let mut res = StatusCode::OK.into_response();
        set_cors_headers(res.headers_mut(), origin);
        return res;
    }

    let mut res = next.run(req).await;
    set_cors_headers(res.headers_mut(), origin);
    res
}

/// Add the CORS headers, leaving any the handler already set.
fn set_cors_headers(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.entry(ACCESS_CONTROL_ALLOW_ORIGIN).or_insert(origin);
    headers
        .entry(ACCESS_CONTROL_ALLOW_CREDENTIALS)
        .or_insert(HeaderValue::from_static("true"));
    headers
        .entry(ACCESS_CONTROL_ALLOW_METHODS)
        .or_insert(HeaderValue::from_static(ALLOW_METHODS));
    headers
        .entry(ACCESS_CONTROL_ALLOW_HEADERS)
        .or_insert(HeaderValue::from_static(ALLOW_HEADERS));
}
