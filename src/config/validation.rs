//! Configuration validation.
//!
//! Serde handles the syntax; this module checks value ranges, address formats,
//! and route lists that would make the gatekeeper misbehave. All violations are
//! reported together.

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatekeeperConfig;
use crate::routing::RouteClassifier;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `rate_limit.window_ms`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a parsed configuration, returning every violation found.
pub fn validate_config(config: &GatekeeperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_socket_addr(&mut errors, "upstream.address", &config.upstream.address);
    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let rate_limit = &config.rate_limit;
    if rate_limit.max_requests == 0 {
        errors.push(ValidationError::new("rate_limit.max_requests", "must be greater than 0"));
    }
    if rate_limit.window_ms == 0 {
        errors.push(ValidationError::new("rate_limit.window_ms", "must be greater than 0"));
    }
    if rate_limit.sweep_interval_secs == 0 {
        errors.push(ValidationError::new(
            "rate_limit.sweep_interval_secs",
            "must be greater than 0",
        ));
    }
    check_prefixes(&mut errors, "rate_limit.prefixes", &rate_limit.prefixes);

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let routes = &config.routes;
    check_prefixes(&mut errors, "routes.public", &routes.public);
    check_prefixes(&mut errors, "routes.protected", &routes.protected);
    check_prefixes(&mut errors, "assets.excluded_prefixes", &config.assets.excluded_prefixes);

    let classifier = RouteClassifier::new(routes.public.clone(), routes.protected.clone());
    for (field, path) in [
        ("routes.login_path", &routes.login_path),
        ("routes.signup_path", &routes.signup_path),
        ("routes.home_path", &routes.home_path),
    ] {
        if !path.starts_with('/') {
            errors.push(ValidationError::new(field, "must start with '/'"));
        }
    }
    for (field, path) in [
        ("routes.login_path", &routes.login_path),
        ("routes.signup_path", &routes.signup_path),
    ] {
        if classifier.classify(path).is_protected {
            errors.push(ValidationError::new(
                field,
                format!("'{path}' matches a protected prefix and would redirect to itself"),
            ));
        }
    }

    match Url::parse(&routes.fallback_origin) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::new(
            "routes.fallback_origin",
            format!("'{}' is not an absolute http(s) URL", routes.fallback_origin),
        )),
    }

    if !is_cookie_token(&config.session.cookie_name) {
        errors.push(ValidationError::new(
            "session.cookie_name",
            format!("'{}' is not a valid cookie name", config.session.cookie_name),
        ));
    }

    if config
        .assets
        .excluded_extensions
        .iter()
        .any(|ext| ext.is_empty() || ext.contains('.') || ext.contains('/'))
    {
        errors.push(ValidationError::new(
            "assets.excluded_extensions",
            "extensions must be non-empty and given without dots or slashes",
        ));
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}'", config.observability.log_format),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            field,
            format!("'{value}' is not a socket address"),
        ));
    }
}

fn check_prefixes(errors: &mut Vec<ValidationError>, field: &str, prefixes: &[String]) {
    for prefix in prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::new(
                field,
                format!("prefix '{prefix}' must start with '/'"),
            ));
        }
    }
}

/// RFC 6265 cookie-name token: visible ASCII without separators.
fn is_cookie_token(name: &str) -> bool {
    const SEPARATORS: &[u8] = b"()<>@,;:\\\"/[]?={} \t";
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && !SEPARATORS.contains(&b))
}
