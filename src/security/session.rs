//! Authentication state from the persisted session cookie.
//!
//! The dashboard's client-side auth store is persisted into a cookie as
//! URI-encoded JSON of the shape:
//!
//! ```json
//! { "state": { "isAuthenticated": true, "user": { ... } }, "version": 0 }
//! ```
//!
//! A request is authenticated iff `state.isAuthenticated` is exactly `true` and
//! `state.user` is present and not `null`. Anything else, including a missing
//! or unreadable cookie, is "not authenticated" and never an error.
//!
//! # Limitations
//! The cookie is client-controlled and carries no signature. This check only
//! decides which pages to redirect; it is not authorization. The backend behind
//! the gatekeeper must verify credentials on every data request.

use axum::http::{header::COOKIE, HeaderMap};
use percent_encoding::percent_decode_str;
use serde_json::Value;

/// Resolves the per-request authentication signal.
#[derive(Debug, Clone)]
pub struct SessionResolver {
    cookie_name: String,
}

impl SessionResolver {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }

    /// Returns true if the request carries a session cookie in the
    /// authenticated shape.
    pub fn resolve(&self, headers: &HeaderMap) -> bool {
        let Some(raw) = find_cookie(headers, &self.cookie_name) else {
            return false;
        };
        if raw.is_empty() {
            return false;
        }

        let decoded = match percent_decode_str(raw).decode_utf8() {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(cookie = %self.cookie_name, error = %e, "Session cookie is not valid UTF-8");
                return false;
            }
        };

        match serde_json::from_str::<Value>(&decoded) {
            Ok(blob) => is_authenticated_shape(&blob),
            Err(e) => {
                tracing::warn!(cookie = %self.cookie_name, error = %e, "Session cookie parse error");
                false
            }
        }
    }
}

fn is_authenticated_shape(blob: &Value) -> bool {
    let flag = blob.pointer("/state/isAuthenticated") == Some(&Value::Bool(true));
    let user = blob
        .pointer("/state/user")
        .is_some_and(|user| !user.is_null());
    flag && user
}

/// Find a cookie value by name across all `Cookie` headers.
fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
}
