//! Request tracing middleware.
//!
//! Every request runs inside a span tagged with its request ID so log lines
//! from handlers and repositories can be correlated.

use axum::{
    body::Body,
    http::{header::HeaderName, Extensions, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied request ID that is trusted as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Client-supplied ID if usable, otherwise a fresh UUID.
fn resolve_request_id(supplied: Option<&str>) -> String {
    supplied
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Middleware that extracts or generates a request ID, logs completion and
/// echoes the ID in the response headers.
pub async fn trace_id(mut req: Request<Body>, next: Next) -> Response {
    let request_id = resolve_request_id(
        req.headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
    );

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let start = std::time::Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;

    span.in_scope(|| {
        tracing::info!(
            status = response.status().as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );
    });

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), header_value);
    }

    response
}

/// The current request's ID, or `unknown` outside the middleware.
pub fn get_request_id(extensions: &Extensions) -> String {
    extensions
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplied_request_id_is_kept() {
        assert_eq!(resolve_request_id(Some(" abc-123 ")), "abc-123");
    }

    #[test]
    fn test_missing_or_blank_request_id_is_generated() {
        for supplied in [None, Some(""), Some("   ")] {
            let id = resolve_request_id(supplied);
            assert!(Uuid::parse_str(&id).is_ok());
        }
    }

    #[test]
    fn test_oversized_request_id_is_replaced() {
        let long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        assert_ne!(resolve_request_id(Some(&long)), long);
    }

    #[test]
    fn test_get_request_id() {
        let mut extensions = Extensions::new();
        assert_eq!(get_request_id(&extensions), "unknown");
        extensions.insert(RequestId("req-1".to_string()));
        assert_eq!(get_request_id(&extensions), "req-1");
    }
}
