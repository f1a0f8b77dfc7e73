//! Security headers middleware.

use axum::{
    body::Body,
    http::{
        header::{self, HeaderName, HeaderValue},
        Request,
    },
    middleware::Next,
    response::Response,
};

/// Headers set on every API response, overriding whatever the handler set.
const FIXED_HEADERS: [(HeaderName, &str); 3] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "no-referrer"),
];

/// Add security headers to API responses.
///
/// `Cache-Control: no-store` is only added when the handler did not choose a
/// caching policy itself, so file listings are never served stale.
pub async fn security_headers(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in FIXED_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }

    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    response
}
