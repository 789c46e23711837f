//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the Axum router: gatekeeper middleware in front of the upstream
//! - Wire up tower layers (request id, tracing, timeout)
//! - Serve on a listener with connect info until shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, middleware, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatekeeperConfig;
use crate::gatekeeper::Gatekeeper;
use crate::http::middleware::gatekeeper_middleware;
use crate::http::request::{request_id, MakeRequestUuid};
use crate::http::upstream::{forward_handler, Upstream};
use crate::security::RateLimitRegistry;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid fallback origin: {0}")]
    Origin(#[from] url::ParseError),

    #[error("invalid upstream address: {0}")]
    Upstream(#[from] axum::http::uri::InvalidUri),
}

/// HTTP server fronting the dashboard.
pub struct HttpServer {
    router: Router,
    config: GatekeeperConfig,
}

impl HttpServer {
    /// Create a server that forwards allowed requests to the configured upstream.
    pub fn new(config: GatekeeperConfig, registry: Arc<RateLimitRegistry>) -> Result<Self, ServerError> {
        let gatekeeper = Gatekeeper::new(&config, registry)?;
        let upstream = Upstream::new(&config.upstream.address)?;

        let downstream = Router::new().fallback(forward_handler).with_state(upstream);
        let router = build_router(&config, gatekeeper, downstream);

        Ok(Self { router, config })
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatekeeperConfig {
        &self.config
    }
}

/// Put the gatekeeper and the ambient layers in front of `downstream`.
#[allow(deprecated)]
pub fn build_router(config: &GatekeeperConfig, gatekeeper: Gatekeeper, downstream: Router) -> Router {
    downstream
        .layer(middleware::from_fn_with_state(gatekeeper, gatekeeper_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request),
                )
            }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
