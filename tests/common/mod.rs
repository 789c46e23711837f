//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use dashboard_gatekeeper::config::GatekeeperConfig;
use dashboard_gatekeeper::http::build_router;
use dashboard_gatekeeper::{Gatekeeper, RateLimitRegistry};

#[allow(dead_code)]
pub const SIGNED_IN: &str = "auth-storage=%7B%22state%22%3A%7B%22isAuthenticated%22%3Atrue%2C%22user%22%3A%7B%22id%22%3A7%7D%7D%2C%22version%22%3A0%7D";

/// Start a mock dashboard on an ephemeral port that answers every request
/// with a fixed page. Returns its address.
#[allow(dead_code)]
pub async fn start_mock_dashboard(body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nX-Frame-Options: SAMEORIGIN\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Gatekeeper in front of an in-process dashboard that counts its hits.
#[allow(dead_code)]
pub fn gated_app(config: &GatekeeperConfig) -> (Router, Arc<AtomicUsize>, Arc<RateLimitRegistry>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let dashboard = Router::new().fallback(move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            "dashboard"
        }
    });

    let registry = Arc::new(RateLimitRegistry::from_config(&config.rate_limit));
    let gatekeeper = Gatekeeper::new(config, registry.clone()).unwrap();
    (build_router(config, gatekeeper, dashboard), hits, registry)
}
