//! Client identifier derivation for rate limiting.
//!
//! Preference order:
//! 1. The peer socket address
//! 2. The whole `X-Forwarded-For` value, trimmed
//! 3. The shared `"anonymous"` bucket
//!
//! The forwarded value is used as-is, so two proxy chains that share a first
//! hop still count separately. All unidentifiable clients share the anonymous
//! counter.

use std::net::IpAddr;

use axum::http::HeaderMap;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const ANONYMOUS: &str = "anonymous";

/// Derive the rate-limit identifier for a request.
pub fn client_identifier(peer: Option<IpAddr>, headers: &HeaderMap) -> String {
    if let Some(ip) = peer {
        return ip.to_string();
    }

    headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|chain| !chain.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| ANONYMOUS.to_owned())
}
