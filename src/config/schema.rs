//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gatekeeper.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gatekeeper.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatekeeperConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Dashboard application server that allowed requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Public and protected route lists plus entry points.
    pub routes: RoutesConfig,

    /// Session cookie settings.
    pub session: SessionConfig,

    /// Static asset paths that bypass the gatekeeper.
    pub assets: AssetsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream (dashboard application) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Requests allowed per identifier per window.
    pub max_requests: u64,

    /// Window length in milliseconds.
    pub window_ms: u64,

    /// Only paths starting with one of these prefixes are rate limited.
    pub prefixes: Vec<String>,

    /// Interval between sweeps of expired entries, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_ms: 60_000,
            prefixes: vec!["/api".to_string()],
            sweep_interval_secs: 300,
        }
    }
}

/// Route classification and redirect targets.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Prefixes reachable without a session.
    pub public: Vec<String>,

    /// Prefixes that require a session.
    pub protected: Vec<String>,

    /// Login entry point; unauthenticated visitors are sent here.
    pub login_path: String,

    /// Signup entry point.
    pub signup_path: String,

    /// Where authenticated visitors of an entry point are sent.
    pub home_path: String,

    /// Origin used for redirects when the request carries no usable Host header.
    pub fallback_origin: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            public: [
                "/login",
                "/signup",
                "/forgot-password",
                "/reset-password",
                "/api/auth/login",
                "/api/auth/signup",
                "/api/health",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            protected: [
                "/dashboard",
                "/top-products",
                "/products",
                "/orders",
                "/notifications",
                "/profile",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            login_path: "/login".to_string(),
            signup_path: "/signup".to_string(),
            home_path: "/".to_string(),
            fallback_origin: "http://localhost:3000".to_string(),
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the cookie holding the persisted auth store.
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "auth-storage".to_string(),
        }
    }
}

/// Static asset exclusions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Path prefixes served without gatekeeping (build output, favicon).
    pub excluded_prefixes: Vec<String>,

    /// File extensions (without the dot) served without gatekeeping.
    pub excluded_extensions: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            excluded_prefixes: ["/_next/static", "/_next/image", "/favicon.ico"]
                .into_iter()
                .map(String::from)
                .collect(),
            excluded_extensions: ["svg", "png", "jpg", "jpeg", "gif", "webp", "ico"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
