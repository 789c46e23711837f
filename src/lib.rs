//! Edge request gatekeeper for the sales dashboard.
//!
//! Every inbound request passes through one pipeline before it reaches the
//! dashboard application: rate limiting, session-state derivation, redirect
//! policy, and security-header injection.

pub mod config;
pub mod gatekeeper;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::GatekeeperConfig;
pub use gatekeeper::{Gatekeeper, PolicyDecision};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use security::RateLimitRegistry;
