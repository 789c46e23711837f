//! Startup orchestration.
//!
//! Order: registry → sweeper → metrics → listener → server. The registry is
//! owned here and handed to the server; it lives until the process exits.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ConfigError, GatekeeperConfig};
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::security::{spawn_sweeper, RateLimitRegistry};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Start every subsystem and serve until SIGINT/SIGTERM.
pub async fn run(config: GatekeeperConfig) -> Result<(), StartupError> {
    let shutdown = Shutdown::new();

    let registry = Arc::new(RateLimitRegistry::from_config(&config.rate_limit));
    let sweeper = spawn_sweeper(
        registry.clone(),
        Duration::from_secs(config.rate_limit.sweep_interval_secs),
        shutdown.subscribe(),
    );
    tracing::info!(
        enabled = config.rate_limit.enabled,
        max_requests = registry.max_requests(),
        window = ?registry.window(),
        prefixes = ?config.rate_limit.prefixes,
        "Rate limiter ready"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    let server = HttpServer::new(config, registry)?;
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::wait_for_signal().await;
    shutdown.trigger();

    let served = server_task
        .await
        .map_err(|e| StartupError::Serve(std::io::Error::other(e)))?;
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "Rate limit sweeper ended abnormally");
    }
    served.map_err(StartupError::Serve)
}
