//! Forwarding requests to the resolved backend.
//!
//! # Responsibilities
//! - Build the outbound URI from the target URL and rewritten path
//! - Merge configured headers over the inbound ones
//! - Optionally rewrite `Host` to the target authority
//! - Stream the backend response back
//! - Turn transport failures into a fixed 500 response

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Request, Uri, Version};
use axum::response::Response;
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use url::Url;

use crate::http::response::{forward_failure, strip_hop_by_hop};
use crate::observability::metrics;

/// HTTP client able to reach `http://` and `https://` backends.
pub type ForwardClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Errors while sending a request to the backend.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid outbound uri {uri}: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

/// Sends requests to a backend on behalf of one proxied service.
#[derive(Clone)]
pub struct Forwarder {
    client: ForwardClient,
    headers: HeaderMap,
    rewrite_host: bool,
    service: String,
}

impl Forwarder {
    /// `headers` are set on every outbound request, replacing same-named
    /// inbound headers.
    pub fn new(
        service: impl Into<String>,
        headers: HeaderMap,
        rewrite_host: bool,
    ) -> Result<Self, rustls::Error> {
        Ok(Self::with_client(build_client()?, service, headers, rewrite_host))
    }

    pub fn with_client(
        client: ForwardClient,
        service: impl Into<String>,
        headers: HeaderMap,
        rewrite_host: bool,
    ) -> Self {
        Self {
            client,
            headers,
            rewrite_host,
            service: service.into(),
        }
    }

    /// Forward `req` to `target` + `outbound_path`.
    ///
    /// Never fails: transport errors become a plain-text 500 mentioning
    /// `original_path`.
    pub async fn forward(
        &self,
        req: Request<Body>,
        target: &Url,
        outbound_path: &str,
        original_path: &str,
    ) -> Response {
        let start_time = Instant::now();
        match self.send(req, target, outbound_path).await {
            Ok(response) => {
                metrics::record_forward(&self.service, response.status().as_u16(), start_time);
                response
            }
            Err(e) => {
                tracing::error!(
                    service = %self.service,
                    target = %target,
                    path = %original_path,
                    error = %e,
                    "failed to proxy request to {}", original_path
                );
                metrics::record_forward_failure(&self.service);
                forward_failure(original_path)
            }
        }
    }

    /// Send without error translation.
    pub async fn send(
        &self,
        req: Request<Body>,
        target: &Url,
        outbound_path: &str,
    ) -> Result<Response, ForwardError> {
        let outbound = self.prepare(req, target, outbound_path)?;
        let response: hyper::Response<Incoming> = self.client.request(outbound).await?;

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }

    /// Rewrite an inbound request into the one sent to the backend.
    pub fn prepare(
        &self,
        req: Request<Body>,
        target: &Url,
        outbound_path: &str,
    ) -> Result<Request<Body>, ForwardError> {
        let uri = outbound_uri(target, outbound_path)?;
        let (mut parts, body) = req.into_parts();

        parts.uri = uri;
        parts.version = Version::HTTP_11;
        strip_hop_by_hop(&mut parts.headers);
        for (name, value) in &self.headers {
            parts.headers.insert(name.clone(), value.clone());
        }
        if self.rewrite_host {
            if let Some(host) = target_authority(target) {
                parts.headers.insert(header::HOST, host);
            }
        }

        Ok(Request::from_parts(parts, body))
    }
}

/// Client with rustls (ring) and webpki roots, plain HTTP still allowed.
pub fn build_client() -> Result<ForwardClient, rustls::Error> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let connector = HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(provider)?
        .https_or_http()
        .enable_all_versions()
        .build();
    Ok(Client::builder(TokioExecutor::new()).build(connector))
}

/// Join the target's base path with the outbound path-and-query.
pub fn outbound_uri(target: &Url, outbound_path: &str) -> Result<Uri, ForwardError> {
    let mut base = target.clone();
    base.set_query(None);
    base.set_fragment(None);
    let joined = format!("{}{}", base.as_str().trim_end_matches('/'), outbound_path);
    joined
        .parse::<Uri>()
        .map_err(|source| ForwardError::InvalidUri { uri: joined, source })
}

/// `host[:port]` of the target, as a `Host` header value.
fn target_authority(target: &Url) -> Option<HeaderValue> {
    let host = target.host_str()?;
    let authority = match target.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    HeaderValue::from_str(&authority).ok()
}
