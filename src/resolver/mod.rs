//! Service URL resolution subsystem.
//!
//! # Data Flow
//! ```text
//! request needs a target
//!     → UrlResolver::resolve
//!     → cache.rs (hit: return immediately)
//!     → ResolverClient::resolve (miss: one directory call)
//!     → cache.rs put with TTL
//!     → Url
//! ```
//!
//! # Design Decisions
//! - No internal retry; a failure is surfaced immediately
//! - Concurrent misses each call the directory (no coalescing)
//! - Errors keep the directory's cause and name the service and domain

pub mod cache;
pub mod static_map;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use futures_util::future::BoxFuture;
use thiserror::Error;
use url::Url;

use crate::observability::metrics;

pub use cache::UrlCache;
pub use static_map::StaticResolver;
pub use types::{Domain, ResolverError, ServiceId, ServiceLocator};

/// Looks up the base URL of a service in some directory.
pub trait ResolverClient: Send + Sync {
    /// Headers that must accompany every call to a resolved service.
    fn service_call_headers(&self) -> HeaderMap;

    /// Resolve the base URL for `locator`.
    fn resolve<'a>(&'a self, locator: &'a ServiceLocator) -> BoxFuture<'a, Result<Url, ResolverError>>;
}

/// A failed resolution, with the service it was for.
#[derive(Debug, Error)]
#[error("failed to get service url for {service_id} on {domain}: {source}")]
pub struct ResolveError {
    pub service_id: ServiceId,
    pub domain: Domain,
    #[source]
    pub source: ResolverError,
}

/// Cache-first resolution for one service.
pub struct UrlResolver {
    locator: ServiceLocator,
    client: Arc<dyn ResolverClient>,
    cache: UrlCache,
    ttl: Duration,
}

impl UrlResolver {
    pub fn new(locator: ServiceLocator, client: Arc<dyn ResolverClient>, ttl: Duration) -> Self {
        Self {
            locator,
            client,
            cache: UrlCache::new(),
            ttl,
        }
    }

    /// The service URL, from cache or from the resolver client.
    pub async fn resolve(&self) -> Result<Url, ResolveError> {
        if let Some(url) = self.cache.get() {
            metrics::record_cache_lookup(true);
            return Ok(url);
        }
        metrics::record_cache_lookup(false);

        tracing::debug!(
            service = %self.locator.service_id,
            domain = %self.locator.domain,
            "requesting service url"
        );

        match self.client.resolve(&self.locator).await {
            Ok(url) => {
                tracing::debug!(
                    service = %self.locator.service_id,
                    url = %url,
                    "successfully retrieved service url"
                );
                metrics::record_resolution(self.locator.service_id.as_str(), true);
                self.cache.put(url.clone(), self.ttl);
                Ok(url)
            }
            Err(source) => {
                metrics::record_resolution(self.locator.service_id.as_str(), false);
                Err(ResolveError {
                    service_id: self.locator.service_id.clone(),
                    domain: self.locator.domain.clone(),
                    source,
                })
            }
        }
    }

    pub fn locator(&self) -> &ServiceLocator {
        &self.locator
    }

    pub fn cache(&self) -> &UrlCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingResolver {
        calls: AtomicUsize,
        fail_with: Option<&'static str>,
    }

    impl CountingResolver {
        fn ok() -> Self {
            Self { calls: AtomicUsize::new(0), fail_with: None }
        }

        fn failing(msg: &'static str) -> Self {
            Self { calls: AtomicUsize::new(0), fail_with: Some(msg) }
        }
    }

    impl ResolverClient for CountingResolver {
        fn service_call_headers(&self) -> HeaderMap {
            HeaderMap::new()
        }

        fn resolve<'a>(&'a self, _locator: &'a ServiceLocator) -> BoxFuture<'a, Result<Url, ResolverError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = match self.fail_with {
                Some(msg) => Err(ResolverError::Unavailable(msg.to_string())),
                None => Ok(Url::parse("https://some-url.com").unwrap()),
            };
            async move { result }.boxed()
        }
    }

    fn locator() -> ServiceLocator {
        ServiceLocator::new(
            ServiceId::new("abc123").unwrap(),
            Domain::new("some.domain.com").unwrap(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_once_within_ttl() {
        let client = Arc::new(CountingResolver::ok());
        let resolver = UrlResolver::new(locator(), client.clone(), Duration::from_secs(60));

        for _ in 0..5 {
            let url = resolver.resolve().await.unwrap();
            assert_eq!(url.as_str(), "https://some-url.com/");
        }
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_again_after_ttl() {
        let client = Arc::new(CountingResolver::ok());
        let resolver = UrlResolver::new(locator(), client.clone(), Duration::from_secs(60));

        resolver.resolve().await.unwrap();
        tokio::time::sleep(Duration::from_millis(60_001)).await;
        resolver.resolve().await.unwrap();

        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_is_wrapped_and_not_cached() {
        let client = Arc::new(CountingResolver::failing("dummy error"));
        let resolver = UrlResolver::new(locator(), client.clone(), Duration::from_secs(60));

        let err = resolver.resolve().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to get service url for abc123 on some.domain.com: dummy error"
        );
        assert_eq!(err.service_id.as_str(), "abc123");

        resolver.resolve().await.unwrap_err();
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
        assert!(!resolver.cache().is_populated());
    }

    /// Each call waits until every party of `gate` is in flight.
    struct GatedResolver {
        calls: AtomicUsize,
        gate: tokio::sync::Barrier,
    }

    impl ResolverClient for GatedResolver {
        fn service_call_headers(&self) -> HeaderMap {
            HeaderMap::new()
        }

        fn resolve<'a>(&'a self, _locator: &'a ServiceLocator) -> BoxFuture<'a, Result<Url, ResolverError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async move {
                self.gate.wait().await;
                Ok(Url::parse("https://some-url.com").unwrap())
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_concurrent_misses_each_call_resolver() {
        let client = Arc::new(GatedResolver {
            calls: AtomicUsize::new(0),
            gate: tokio::sync::Barrier::new(2),
        });
        let resolver = UrlResolver::new(locator(), client.clone(), Duration::from_secs(60));

        let (a, b) = tokio::join!(resolver.resolve(), resolver.resolve());
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
        assert!(resolver.cache().is_populated());

        resolver.resolve().await.unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }
}
