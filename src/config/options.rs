//! Validated, immutable proxy options.

use std::time::Duration;

use axum::http::HeaderMap;

use crate::config::loader::{domain_from_env, ConfigError};
use crate::config::schema::ServiceConfig;
use crate::config::validation::validate_service;
use crate::resolver::types::{Domain, ServiceId, ServiceLocator};
use crate::routing::RewritePolicy;

/// Resolved URLs are cached for 30 minutes unless configured otherwise.
pub const DEFAULT_URL_CACHE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Options a [`ServiceProxy`](crate::http::ServiceProxy) is built from.
#[derive(Debug, Clone)]
pub struct ProxyOptions {
    pub service_id: ServiceId,
    pub domain: Domain,
    pub rewrite: RewritePolicy,
    pub url_cache_timeout: Duration,
    /// Operator headers; they override the resolver's service-call headers.
    pub headers: HeaderMap,
    pub rewrite_host_header: bool,
    /// Normalized mount point, `/` or a path without trailing slash.
    pub mount_path: String,
}

impl ProxyOptions {
    /// Validate `config`, taking the domain from `SERVICE_PROXY_DOMAIN` when
    /// the config has none.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        let env_domain = domain_from_env();
        validate_service(config, env_domain.as_deref()).map_err(ConfigError::Validation)
    }

    pub fn locator(&self) -> ServiceLocator {
        ServiceLocator::new(self.service_id.clone(), self.domain.clone())
    }
}
