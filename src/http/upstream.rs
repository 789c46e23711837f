//! Forwarding of allowed requests to the dashboard application.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::http::request::request_id;

/// Upstream target and HTTP client shared by the forwarding handler.
#[derive(Clone)]
pub struct Upstream {
    client: Client<HttpConnector, Body>,
    authority: Authority,
}

impl Upstream {
    pub fn new(address: &str) -> Result<Self, axum::http::uri::InvalidUri> {
        let authority = address.parse::<Authority>()?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Ok(Self { client, authority })
    }

    /// Rewrite the request URI to point at the upstream, keeping path and query.
    fn upstream_uri(&self, uri: &Uri) -> Uri {
        let mut parts = axum::http::uri::Parts::default();
        parts.scheme = Some(Scheme::HTTP);
        parts.authority = Some(self.authority.clone());
        parts.path_and_query = Some(
            uri.path_and_query()
                .cloned()
                .unwrap_or_else(|| PathAndQuery::from_static("/")),
        );
        Uri::from_parts(parts).unwrap_or_else(|_| uri.clone())
    }
}

/// Fallback handler: forward the request as-is and stream the reply back.
pub async fn forward_handler(State(upstream): State<Upstream>, mut request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request).to_owned();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    *request.uri_mut() = upstream.upstream_uri(request.uri());
    *request.version_mut() = Version::HTTP_11;

    match upstream.client.request(request).await {
        Ok(response) => {
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = %response.status(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Upstream responded"
            );
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, path = %path, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
