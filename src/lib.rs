//! Service proxy library.
//!
//! Axum middleware that resolves the URL of a named backend service through a
//! [`ResolverClient`](resolver::ResolverClient), caches it for a bounded time,
//! and forwards requests to it with the configured path rewriting.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::Router;
//! use service_proxy::config::ServiceConfig;
//! use service_proxy::http::ServiceProxy;
//! use service_proxy::resolver::StaticResolver;
//!
//! # fn build() -> Result<Router, service_proxy::config::ConfigError> {
//! let config = ServiceConfig {
//!     service_id: "fakeServiceGuid".into(),
//!     domain: Some("your-domain.example.com".into()),
//!     no_trim: true,
//!     mount_path: "/parent".into(),
//!     ..ServiceConfig::default()
//! };
//! let resolver = StaticResolver::new().with_service("fakeServiceGuid", "http://127.0.0.1:8002");
//! let proxy = ServiceProxy::new(&config, Arc::new(resolver))?;
//! Ok(proxy.mount(Router::new()))
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resolver;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use error::{ProxyError, ResolutionFailure};
pub use http::{HttpServer, ServiceProxy};
pub use lifecycle::Shutdown;
