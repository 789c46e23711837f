//! Edge request gatekeeper.
//!
//! # Data Flow
//! ```text
//! Request (method, path, headers, peer address)
//!     → asset exclusion (static files skip everything below)
//!     → policy.rs rule list
//!         1. rate limit      (security::rate_limit)
//!         2. entry points    (security::session)
//!         3. protected route (routing::classifier + security::session)
//!     → PolicyDecision
//!     → http::middleware renders it
//! ```
//!
//! The gatekeeper holds only immutable configuration plus a handle to the
//! rate-limit registry, which the caller constructs and owns. Cloning is cheap.

pub mod policy;
pub mod redirect;

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::http::{uri::Authority, HeaderMap, Method};
use url::Url;

use crate::config::GatekeeperConfig;
use crate::routing::matcher::{AnyMatcher, Matcher};
use crate::routing::{AssetExclusion, RouteClassifier};
use crate::security::{RateLimitRegistry, SessionResolver};

pub use policy::{decide, Evaluation, PolicyDecision};
pub use redirect::EntryPoints;

/// The parts of a request the gatekeeper looks at.
#[derive(Debug, Clone, Copy)]
pub struct RequestFacts<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub headers: &'a HeaderMap,
    /// Peer socket address, when the transport exposes one.
    pub peer: Option<IpAddr>,
}

#[derive(Clone)]
pub struct Gatekeeper {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Arc<RateLimitRegistry>,
    rate_limit_enabled: bool,
    rate_limited_paths: AnyMatcher,
    classifier: RouteClassifier,
    session: SessionResolver,
    entry_points: EntryPoints,
    assets: AssetExclusion,
    fallback_origin: Url,
}

impl Gatekeeper {
    /// Build a gatekeeper around an externally owned registry.
    pub fn new(
        config: &GatekeeperConfig,
        registry: Arc<RateLimitRegistry>,
    ) -> Result<Self, url::ParseError> {
        let routes = &config.routes;
        let fallback_origin = Url::parse(&routes.fallback_origin)?;

        Ok(Self {
            inner: Arc::new(Inner {
                registry,
                rate_limit_enabled: config.rate_limit.enabled,
                rate_limited_paths: AnyMatcher::prefixes(config.rate_limit.prefixes.clone()),
                classifier: RouteClassifier::new(routes.public.clone(), routes.protected.clone()),
                session: SessionResolver::new(config.session.cookie_name.clone()),
                entry_points: EntryPoints {
                    login: routes.login_path.clone(),
                    signup: routes.signup_path.clone(),
                    home: routes.home_path.clone(),
                },
                assets: AssetExclusion::new(
                    &config.assets.excluded_prefixes,
                    &config.assets.excluded_extensions,
                ),
                fallback_origin,
            }),
        })
    }

    /// Decide what happens to a request.
    pub fn evaluate(&self, facts: &RequestFacts<'_>, now: Instant) -> PolicyDecision {
        let eval = Evaluation::new(self, facts, now);
        let decision = decide(&eval);

        let classification = eval.classification();
        tracing::debug!(
            method = %facts.method,
            path = %facts.path,
            decision = decision.label(),
            public = classification.is_public,
            protected = classification.is_protected,
            authenticated = ?eval.resolved_auth(),
            "Gatekeeper decision"
        );
        decision
    }

    /// Static assets bypass the gatekeeper entirely.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.inner.assets.is_excluded(path)
    }

    pub fn is_rate_limited_path(&self, path: &str) -> bool {
        self.inner.rate_limit_enabled && self.inner.rate_limited_paths.matches(path)
    }

    pub fn registry(&self) -> &Arc<RateLimitRegistry> {
        &self.inner.registry
    }

    pub fn classifier(&self) -> &RouteClassifier {
        &self.inner.classifier
    }

    pub fn session(&self) -> &SessionResolver {
        &self.inner.session
    }

    pub fn entry_points(&self) -> &EntryPoints {
        &self.inner.entry_points
    }

    /// Absolute home URL on the request's origin.
    pub fn home_location(&self, headers: &HeaderMap, authority: Option<&Authority>) -> Url {
        let origin = redirect::request_origin(headers, authority, &self.inner.fallback_origin);
        redirect::location(&origin, &self.inner.entry_points.home)
    }

    /// Absolute login URL on the request's origin, returning to `return_to`.
    pub fn login_location(
        &self,
        headers: &HeaderMap,
        authority: Option<&Authority>,
        return_to: &str,
    ) -> Url {
        let origin = redirect::request_origin(headers, authority, &self.inner.fallback_origin);
        redirect::login_location(&origin, &self.inner.entry_points.login, return_to)
    }
}
