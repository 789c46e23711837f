//! Gatekeeper middleware.
//! Runs the policy for every non-asset request before the downstream handler.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::gatekeeper::{Gatekeeper, PolicyDecision, RequestFacts};
use crate::http::request::request_id;
use crate::http::response;
use crate::observability::metrics;
use crate::security::apply_security_headers;

pub async fn gatekeeper_middleware(
    State(gatekeeper): State<Gatekeeper>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // 1. Static assets pass straight through, untouched.
    if gatekeeper.is_excluded(request.uri().path()) {
        return next.run(request).await;
    }

    // 2. Decide. ConnectInfo is absent when served without connect info.
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let facts = RequestFacts {
        method: request.method(),
        path: request.uri().path(),
        headers: request.headers(),
        peer,
    };
    let decision = gatekeeper.evaluate(&facts, Instant::now());
    metrics::record_decision(decision.label());

    // 3. Render, or forward and stamp headers.
    match decision {
        PolicyDecision::RateLimited => {
            let registry = gatekeeper.registry();
            response::rate_limited(registry.max_requests(), registry.retry_after_secs())
        }
        PolicyDecision::RedirectToHome => {
            let location = gatekeeper.home_location(request.headers(), request.uri().authority());
            response::redirect(&location)
        }
        PolicyDecision::RedirectToLogin { return_to } => {
            tracing::debug!(request_id = %request_id(&request), return_to = %return_to, "Login required");
            let location =
                gatekeeper.login_location(request.headers(), request.uri().authority(), &return_to);
            response::redirect(&location)
        }
        PolicyDecision::Allow { preflight: true } => response::preflight(),
        PolicyDecision::Allow { preflight: false } => {
            let mut response = next.run(request).await;
            apply_security_headers(response.headers_mut());
            response
        }
    }
}
