//! Service Proxy Middleware.
//! Resolves the service URL and forwards the request to it.
//!
//! # Per-request states
//! ```text
//! Idle → Resolving ─┬→ Forwarding  (rewrite path, forward, done)
//!                   └→ Failed      (attach ResolutionFailure, call next)
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::{Request, Uri},
    middleware::{self, Next},
    response::Response,
    routing::any,
    Router,
};
use url::Url;

use crate::config::{ConfigError, ProxyOptions, ServiceConfig};
use crate::error::{ProxyError, ResolutionFailure};
use crate::http::forward::Forwarder;
use crate::http::request::request_id;
use crate::http::response::resolution_failure_handler;
use crate::resolver::{ResolverClient, ServiceId, UrlResolver};
use crate::routing::RewritePolicy;

struct Inner {
    service_id: ServiceId,
    resolver: UrlResolver,
    rewrite: RewritePolicy,
    forwarder: Forwarder,
    mount_path: String,
}

/// A proxy to one configured service.
///
/// Cloning shares the instance, including its URL cache. Two proxies built
/// separately never share a cache.
#[derive(Clone)]
pub struct ServiceProxy {
    inner: Arc<Inner>,
}

impl ServiceProxy {
    /// Validate `config` and build a proxy resolving through `client`.
    pub fn new(config: &ServiceConfig, client: Arc<dyn ResolverClient>) -> Result<Self, ConfigError> {
        let options = ProxyOptions::from_config(config)?;
        Self::from_options(options, client)
    }

    pub fn from_options(options: ProxyOptions, client: Arc<dyn ResolverClient>) -> Result<Self, ConfigError> {
        tracing::info!(
            service = %options.service_id,
            domain = %options.domain,
            rewrite = ?options.rewrite,
            cache_ms = u64::try_from(options.url_cache_timeout.as_millis()).unwrap_or(u64::MAX),
            "creating service proxy"
        );

        // Resolver headers are the base, operator headers win.
        let mut headers = client.service_call_headers();
        for (name, value) in &options.headers {
            headers.insert(name.clone(), value.clone());
        }

        let forwarder = Forwarder::new(
            options.service_id.as_str(),
            headers,
            options.rewrite_host_header,
        )?;
        let resolver = UrlResolver::new(options.locator(), client, options.url_cache_timeout);

        Ok(Self {
            inner: Arc::new(Inner {
                service_id: options.service_id,
                resolver,
                rewrite: options.rewrite,
                forwarder,
                mount_path: options.mount_path,
            }),
        })
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.inner.service_id
    }

    pub fn mount_path(&self) -> &str {
        &self.inner.mount_path
    }

    pub fn resolver(&self) -> &UrlResolver {
        &self.inner.resolver
    }

    /// Resolve the target URL, wrapping failures with the service id.
    pub async fn resolve(&self) -> Result<Url, ProxyError> {
        self.inner
            .resolver
            .resolve()
            .await
            .map_err(|source| ProxyError::Resolution {
                service_id: self.inner.service_id.clone(),
                source,
            })
    }

    /// Rewrite the path of `req` and forward it to `target`.
    pub async fn forward(&self, req: Request<Body>, target: &Url) -> Response {
        let mount_relative = path_and_query(req.uri());
        let original = req
            .extensions()
            .get::<OriginalUri>()
            .map(|OriginalUri(uri)| path_and_query(uri))
            .unwrap_or_else(|| mount_relative.clone());
        let outbound = self.inner.rewrite.outbound_path(&original, &mount_relative);

        tracing::debug!(
            request_id = %request_id(req.headers()),
            service = %self.inner.service_id,
            "proxying request for {} to {}{}",
            original,
            target.as_str().trim_end_matches('/'),
            outbound
        );

        self.inner
            .forwarder
            .forward(req, target, &outbound, &original)
            .await
    }

    /// Mount this proxy on `router` at the configured mount path, with
    /// [`resolution_failure_handler`] as the next handler.
    ///
    /// Nesting covers `<mount>` and `<mount>/...`; `<mount>/` is routed
    /// separately and seen by the proxy as the mount-relative `/`.
    pub fn mount(self, router: Router) -> Router {
        let mount_path = self.inner.mount_path.clone();
        if mount_path == "/" {
            return router.merge(self.proxied_routes());
        }

        let mount_root = any(resolution_failure_handler)
            .layer(middleware::from_fn_with_state(self.clone(), service_proxy_middleware))
            .layer(middleware::map_request(to_mount_root));
        router
            .route(&format!("{mount_path}/"), mount_root)
            .nest(&mount_path, self.proxied_routes())
    }

    fn proxied_routes(self) -> Router {
        Router::new()
            .route("/", any(resolution_failure_handler))
            .route("/{*path}", any(resolution_failure_handler))
            .layer(middleware::from_fn_with_state(self, service_proxy_middleware))
    }
}

/// Middleware entry point.
///
/// Forwards the request and returns the backend response. When the service
/// URL cannot be resolved, attaches a [`ResolutionFailure`] to the request and
/// hands it to `next` instead.
pub async fn service_proxy_middleware(
    State(proxy): State<ServiceProxy>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!(
        request_id = %request_id(req.headers()),
        service = %proxy.service_id(),
        uri = %req.uri(),
        "received request"
    );

    match proxy.resolve().await {
        Ok(target) => proxy.forward(req, &target).await,
        Err(err) => {
            tracing::warn!(
                request_id = %request_id(req.headers()),
                error = %err,
                "service url resolution failed"
            );
            req.extensions_mut().insert(ResolutionFailure::new(err));
            next.run(req).await
        }
    }
}

/// Replace the path with `/`, keeping the query.
async fn to_mount_root(mut req: Request<Body>) -> Request<Body> {
    let root = match req.uri().query() {
        Some(query) => format!("/?{query}"),
        None => "/".to_string(),
    };
    if let Ok(uri) = root.parse::<Uri>() {
        *req.uri_mut() = uri;
    }
    req
}

fn path_and_query(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{ResolverError, ServiceLocator};
    use axum::http::{HeaderMap, HeaderValue, StatusCode};
    use futures_util::future::{BoxFuture, FutureExt};
    use tower::ServiceExt;

    struct FailingResolver;

    impl ResolverClient for FailingResolver {
        fn service_call_headers(&self) -> HeaderMap {
            let mut headers = HeaderMap::new();
            headers.insert("x-api-key", HeaderValue::from_static("from-resolver"));
            headers.insert("x-fh-auth", HeaderValue::from_static("resolver-token"));
            headers
        }

        fn resolve<'a>(&'a self, _locator: &'a ServiceLocator) -> BoxFuture<'a, Result<Url, ResolverError>> {
            async { Err(ResolverError::Unavailable("dummy error".into())) }.boxed()
        }
    }

    fn config() -> ServiceConfig {
        ServiceConfig {
            service_id: "abc123".into(),
            domain: Some("some.domain.com".into()),
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn test_empty_service_id_fails_construction() {
        let config = ServiceConfig {
            service_id: String::new(),
            ..config()
        };
        let err = ServiceProxy::new(&config, Arc::new(FailingResolver)).err().unwrap();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_route_syntax_in_mount_path_fails_construction() {
        let config = ServiceConfig {
            mount_path: "/api/{*rest}".into(),
            ..config()
        };
        let err = ServiceProxy::new(&config, Arc::new(FailingResolver)).err().unwrap();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[tokio::test]
    async fn test_resolution_error_goes_to_next() {
        let proxy = ServiceProxy::new(&config(), Arc::new(FailingResolver)).unwrap();
        let app = proxy.mount(Router::new());

        let response = app
            .oneshot(Request::builder().uri("/auth").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let message = String::from_utf8(body.to_vec()).unwrap();
        assert!(message.contains("abc123"), "{message}");
        assert!(message.contains("dummy error"), "{message}");
        assert!(message.starts_with("failed to proxy req to service abc123: "));
    }

    #[tokio::test]
    async fn test_custom_next_receives_error() {
        let proxy = ServiceProxy::new(&config(), Arc::new(FailingResolver)).unwrap();
        let app = Router::new()
            .route(
                "/{*path}",
                any(|req: Request<Body>| async move {
                    let failure = req.extensions().get::<ResolutionFailure>().cloned();
                    match failure {
                        Some(f) => (StatusCode::SERVICE_UNAVAILABLE, f.error().to_string()),
                        None => (StatusCode::OK, String::new()),
                    }
                }),
            )
            .layer(middleware::from_fn_with_state(proxy, service_proxy_middleware));

        let response = app
            .oneshot(Request::builder().uri("/auth").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_path_and_query() {
        assert_eq!(path_and_query(&"/things/car?x=1".parse().unwrap()), "/things/car?x=1");
        assert_eq!(path_and_query(&"http://host".parse().unwrap()), "/");
    }

    #[tokio::test]
    async fn test_to_mount_root_keeps_query() {
        let req = Request::builder().uri("/parent/?x=1").body(Body::empty()).unwrap();
        assert_eq!(to_mount_root(req).await.uri(), "/?x=1");

        let req = Request::builder().uri("/parent/").body(Body::empty()).unwrap();
        assert_eq!(to_mount_root(req).await.uri(), "/");
    }
}
