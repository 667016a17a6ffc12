//! Resolver backed by a fixed service map.
//!
//! Lookup order: explicit entry for the service id, then the URL template,
//! then `NotFound`. `SERVICE_PROXY_SERVICE_MAP` (a JSON object of service id
//! to URL) overrides configured entries for local development.

use std::collections::HashMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use futures_util::future::{self, BoxFuture, FutureExt};
use url::Url;

use crate::config::ResolverConfig;
use crate::resolver::types::{ResolverError, ServiceLocator};
use crate::resolver::ResolverClient;

/// Environment variable holding local service overrides.
pub const SERVICE_MAP_ENV: &str = "SERVICE_PROXY_SERVICE_MAP";

/// Resolves services from configuration instead of a remote directory.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    services: HashMap<String, String>,
    url_template: Option<String>,
    call_headers: HeaderMap,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `[resolver]` config table. Headers that are not valid
    /// HTTP are skipped with a warning.
    pub fn from_config(config: &ResolverConfig) -> Self {
        let mut resolver = Self {
            services: config.services.clone(),
            url_template: config.url_template.clone(),
            call_headers: HeaderMap::new(),
        };
        for (name, value) in &config.call_headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    resolver.call_headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Ignoring invalid service call header"),
            }
        }
        resolver
    }

    /// Register a fixed URL for a service.
    pub fn with_service(mut self, service_id: impl Into<String>, url: impl Into<String>) -> Self {
        self.services.insert(service_id.into(), url.into());
        self
    }

    /// Fallback pattern, e.g. `https://{service}.{domain}`.
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = Some(template.into());
        self
    }

    pub fn with_call_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.call_headers.insert(name, value);
        self
    }

    /// Apply overrides from `SERVICE_PROXY_SERVICE_MAP`, if set.
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(SERVICE_MAP_ENV) {
            Ok(raw) => self.with_overrides_json(&raw),
            Err(_) => self,
        }
    }

    fn with_overrides_json(mut self, raw: &str) -> Self {
        match serde_json::from_str::<HashMap<String, String>>(raw) {
            Ok(map) => {
                tracing::info!(count = map.len(), "Loaded service map overrides");
                self.services.extend(map);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed {}", SERVICE_MAP_ENV);
            }
        }
        self
    }

    fn lookup(&self, locator: &ServiceLocator) -> Result<Url, ResolverError> {
        let raw = match self.services.get(locator.service_id.as_str()) {
            Some(url) => url.clone(),
            None => match &self.url_template {
                Some(template) => template
                    .replace("{service}", locator.service_id.as_str())
                    .replace("{domain}", locator.domain.as_str()),
                None => {
                    return Err(ResolverError::NotFound {
                        service_id: locator.service_id.to_string(),
                        domain: locator.domain.to_string(),
                    })
                }
            },
        };

        let url = Url::parse(&raw).map_err(|e| ResolverError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ResolverError::InvalidUrl {
                url: raw,
                reason: format!("unsupported scheme {other}"),
            }),
        }
    }
}

impl ResolverClient for StaticResolver {
    fn service_call_headers(&self) -> HeaderMap {
        self.call_headers.clone()
    }

    fn resolve<'a>(&'a self, locator: &'a ServiceLocator) -> BoxFuture<'a, Result<Url, ResolverError>> {
        future::ready(self.lookup(locator)).boxed()
    }
}
