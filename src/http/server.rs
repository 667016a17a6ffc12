//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the service proxy mounted
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener
//! - Stop gracefully on the shutdown signal

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::{ConfigError, ProxyConfig};
use crate::http::middleware::ServiceProxy;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::resolver::ResolverClient;

/// HTTP server for the service proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    proxy: ServiceProxy,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails if the service configuration is invalid.
    pub fn new(config: ProxyConfig, resolver: Arc<dyn ResolverClient>) -> Result<Self, ConfigError> {
        let proxy = ServiceProxy::new(&config.service, resolver)?;
        let router = Self::build_router(proxy.clone());
        Ok(Self {
            router,
            config,
            proxy,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(proxy: ServiceProxy) -> Router {
        proxy.mount(Router::new()).layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer()),
        )
    }

    /// The fully layered router, e.g. for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = %self.proxy.service_id(),
            mount_path = %self.proxy.mount_path(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        self.proxy.resolver().cache().invalidate();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn proxy(&self) -> &ServiceProxy {
        &self.proxy
    }
}
