// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Security headers middleware for the explorer API.

use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Headers added to every API response. The API only serves JSON, so
/// nothing may be framed, sniffed or executed.
const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    (
        "strict-transport-security",
        "max-age=31536000; includeSubDomains",
    ),
    (
        "content-security-policy",
        "default-src 'none'; frame-ancestors 'none'",
    ),
    ("referrer-policy", "strict-origin-when-cross-origin"),
];

/// Explorer data changes only when the catalog refreshes.
const CACHE_CONTROL: &str = "public, max-age=60";

/// Add security headers to all responses, and a short cache lifetime to
/// successful GETs that did not set their own.
pub async fn add_security_headers(req: Request, next: Next) -> Response {
    let is_get = req.method() == axum::http::Method::GET;
    let mut response = next.run(req).await;
    let success = response.status().is_success();
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    if is_get && success && !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
    }

    response
}
