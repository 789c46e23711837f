//! Ordered policy rules.
//!
//! Rules run top to bottom and the first one that returns a decision wins:
//!
//! | # | rule                        | outcome           |
//! |---|-----------------------------|-------------------|
//! | 1 | `rate_limit`                | `RateLimited`     |
//! | 2 | `authenticated_entry_point` | `RedirectToHome`  |
//! | 3 | `unauthenticated_protected` | `RedirectToLogin` |
//! | - | no rule matched             | `Allow`           |
//!
//! Only `rate_limit` touches shared state. The session cookie is parsed lazily,
//! at most once, and never for a rate-limited request.

use std::cell::OnceCell;
use std::time::Instant;

use axum::http::Method;

use crate::gatekeeper::{Gatekeeper, RequestFacts};
use crate::observability::metrics;
use crate::routing::RouteClassification;
use crate::security::client_identifier;

/// Outcome of the gatekeeper for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Over the rate limit; reply 429.
    RateLimited,
    /// Authenticated visitor on an entry point; send to the home page.
    RedirectToHome,
    /// Anonymous visitor on a protected route; send to login and come back.
    RedirectToLogin { return_to: String },
    /// Let the request through. Preflights are answered without forwarding.
    Allow { preflight: bool },
}

impl PolicyDecision {
    pub fn label(&self) -> &'static str {
        match self {
            PolicyDecision::RateLimited => "rate_limited",
            PolicyDecision::RedirectToHome => "redirect_home",
            PolicyDecision::RedirectToLogin { .. } => "redirect_login",
            PolicyDecision::Allow { preflight: true } => "preflight",
            PolicyDecision::Allow { preflight: false } => "allow",
        }
    }
}

/// Per-request inputs shared by the rules.
pub struct Evaluation<'a> {
    gatekeeper: &'a Gatekeeper,
    facts: &'a RequestFacts<'a>,
    now: Instant,
    authenticated: OnceCell<bool>,
    classification: OnceCell<RouteClassification>,
}

impl<'a> Evaluation<'a> {
    pub(crate) fn new(gatekeeper: &'a Gatekeeper, facts: &'a RequestFacts<'a>, now: Instant) -> Self {
        Self {
            gatekeeper,
            facts,
            now,
            authenticated: OnceCell::new(),
            classification: OnceCell::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        *self
            .authenticated
            .get_or_init(|| self.gatekeeper.session().resolve(self.facts.headers))
    }

    pub fn classification(&self) -> RouteClassification {
        *self
            .classification
            .get_or_init(|| self.gatekeeper.classifier().classify(self.facts.path))
    }

    /// Auth state if some rule already needed it.
    pub fn resolved_auth(&self) -> Option<bool> {
        self.authenticated.get().copied()
    }
}

pub type Rule = fn(&Evaluation<'_>) -> Option<PolicyDecision>;

/// The decision list, in precedence order.
pub const RULES: [(&str, Rule); 3] = [
    ("rate_limit", rate_limit),
    ("authenticated_entry_point", authenticated_entry_point),
    ("unauthenticated_protected", unauthenticated_protected),
];

/// Run the rules; the first decision wins, otherwise allow.
pub fn decide(eval: &Evaluation<'_>) -> PolicyDecision {
    RULES
        .iter()
        .find_map(|(_, rule)| rule(eval))
        .unwrap_or(PolicyDecision::Allow {
            preflight: *eval.facts.method == Method::OPTIONS,
        })
}

fn rate_limit(eval: &Evaluation<'_>) -> Option<PolicyDecision> {
    let gatekeeper = eval.gatekeeper;
    if !gatekeeper.is_rate_limited_path(eval.facts.path) {
        return None;
    }

    let identifier = client_identifier(eval.facts.peer, eval.facts.headers);
    if gatekeeper.registry().check_and_record(&identifier, eval.now) {
        return None;
    }

    tracing::warn!(client = %identifier, path = %eval.facts.path, "Rate limit exceeded");
    metrics::record_rate_limited();
    Some(PolicyDecision::RateLimited)
}

fn authenticated_entry_point(eval: &Evaluation<'_>) -> Option<PolicyDecision> {
    let entry_points = eval.gatekeeper.entry_points();
    let on_entry_point = eval.facts.path == entry_points.login || eval.facts.path == entry_points.signup;

    (on_entry_point && eval.is_authenticated()).then_some(PolicyDecision::RedirectToHome)
}

fn unauthenticated_protected(eval: &Evaluation<'_>) -> Option<PolicyDecision> {
    (eval.classification().is_protected && !eval.is_authenticated()).then(|| {
        PolicyDecision::RedirectToLogin {
            return_to: eval.facts.path.to_owned(),
        }
    })
}
