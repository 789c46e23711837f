//! Rendering of gatekeeper outcomes.
//!
//! # Responsibilities
//! - 429 body and rate-limit headers
//! - Temporary redirects to absolute URLs
//! - Empty preflight replies carrying the security header set

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use url::Url;

use crate::security::apply_security_headers;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// JSON body of a 429 reply.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitBody {
    pub error: &'static str,
    pub message: &'static str,
    pub retry_after: u64,
}

pub fn rate_limited(limit: u64, retry_after_secs: u64) -> Response {
    let body = RateLimitBody {
        error: "Too many requests",
        message: "Please slow down and try again later",
        retry_after: retry_after_secs,
    };

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    let headers = response.headers_mut();
    headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from_static("0"));
    response
}

/// 307 Temporary Redirect; the method and body are preserved by the client.
pub fn redirect(location: &Url) -> Response {
    Redirect::temporary(location.as_str()).into_response()
}

pub fn preflight() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::OK;
    apply_security_headers(response.headers_mut());
    response
}
