//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::{HeaderMap, HeaderValue, Method, Request},
    routing::any,
    Json, Router,
};
use futures_util::future::{BoxFuture, FutureExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;
use url::Url;

use service_proxy::config::ServiceConfig;
use service_proxy::resolver::{ResolverClient, ResolverError, ServiceLocator};

pub const SERVICE_ID: &str = "abc123";
pub const DOMAIN: &str = "some.domain.com";

/// A backend that answers every request with a JSON description of it.
pub struct EchoBackend {
    pub addr: SocketAddr,
    pub hits: Arc<AtomicUsize>,
}

impl EchoBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn echo(
    State(hits): State<Arc<AtomicUsize>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    let headers: serde_json::Map<String, Value> = headers
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v.to_str().unwrap_or_default())))
        .collect();
    Json(json!({
        "method": method.as_str(),
        "path": uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/"),
        "headers": headers,
    }))
}

/// Start an echo backend on an ephemeral port.
pub async fn start_echo_backend() -> EchoBackend {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/", any(echo))
        .route("/{*path}", any(echo))
        .with_state(hits.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    EchoBackend { addr, hits }
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Resolver returning a fixed outcome and counting its calls.
pub struct CountingResolver {
    outcome: Result<String, String>,
    headers: HeaderMap,
    calls: AtomicUsize,
}

impl CountingResolver {
    pub fn returning(url: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(url.into()),
            headers: HeaderMap::new(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(message.into()),
            headers: HeaderMap::new(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn with_headers(url: impl Into<String>, headers: &[(&'static str, &'static str)]) -> Arc<Self> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        Arc::new(Self {
            outcome: Ok(url.into()),
            headers: map,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ResolverClient for CountingResolver {
    fn service_call_headers(&self) -> HeaderMap {
        self.headers.clone()
    }

    fn resolve<'a>(&'a self, _locator: &'a ServiceLocator) -> BoxFuture<'a, Result<Url, ResolverError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = match &self.outcome {
            Ok(url) => Url::parse(url).map_err(|e| ResolverError::InvalidUrl {
                url: url.clone(),
                reason: e.to_string(),
            }),
            Err(message) => Err(ResolverError::Unavailable(message.clone())),
        };
        async move { result }.boxed()
    }
}

/// A valid service config for [`SERVICE_ID`] on [`DOMAIN`].
pub fn service_config() -> ServiceConfig {
    ServiceConfig {
        service_id: SERVICE_ID.into(),
        domain: Some(DOMAIN.into()),
        ..ServiceConfig::default()
    }
}

/// Send a GET through `app` and return status, headers and body.
pub async fn get(app: &Router, uri: &str) -> (u16, HeaderMap, Vec<u8>) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn send(app: &Router, req: Request<Body>) -> (u16, HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body.to_vec())
}

/// Parse an echo backend response body.
pub fn echoed(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}
