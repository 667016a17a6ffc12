//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Root configuration for the service proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The proxied service and how requests are rewritten for it.
    pub service: ServiceConfig,

    /// Settings for the bundled static resolver.
    pub resolver: ResolverConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Options for one proxied service.
///
/// Deserialized as-is; [`crate::config::validation::validate_service`] turns
/// it into [`crate::config::ProxyOptions`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Identifier of the backend service. Required.
    pub service_id: String,

    /// Domain the service is hosted on. Falls back to `SERVICE_PROXY_DOMAIN`.
    pub domain: Option<String>,

    /// Forward the full original path, ignoring the mount point.
    pub no_trim: bool,

    /// Leading path segment stripped from the mount-relative path.
    pub trim_prefix: Option<String>,

    /// How long a resolved URL stays cached, in milliseconds.
    pub url_cache_timeout_ms: Option<u64>,

    /// Extra headers added to every forwarded request.
    pub headers: BTreeMap<String, String>,

    /// Rewrite the outbound `Host` header to the target authority.
    pub rewrite_host_header: bool,

    /// Path at which the proxy is mounted on the host router.
    pub mount_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_id: String::new(),
            domain: None,
            no_trim: false,
            trim_prefix: None,
            url_cache_timeout_ms: None,
            headers: BTreeMap::new(),
            rewrite_host_header: true,
            mount_path: "/".to_string(),
        }
    }
}

/// Static resolver configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ResolverConfig {
    /// Service id -> base URL.
    pub services: HashMap<String, String>,

    /// Fallback URL pattern with `{service}` and `{domain}` placeholders.
    pub url_template: Option<String>,

    /// Headers every service call must carry.
    pub call_headers: BTreeMap<String, String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
