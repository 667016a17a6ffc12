//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require a service id and a domain
//! - Check the rewrite policy is unambiguous and well-formed
//! - Validate value ranges and header syntax
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure function: ServiceConfig → Result<ProxyOptions, Vec<ValidationError>>
//! - Runs before the proxy is constructed

use std::time::Duration;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;

use crate::config::options::{ProxyOptions, DEFAULT_URL_CACHE_TIMEOUT};
use crate::config::schema::ServiceConfig;
use crate::resolver::types::{Domain, ServiceId};
use crate::routing::RewritePolicy;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("service_id is required and should be the service id")]
    MissingServiceId,

    #[error("domain or SERVICE_PROXY_DOMAIN must be set to the domain the service is hosted on")]
    MissingDomain,

    #[error("trim_prefix {0:?} must start with '/', must not end with '/' and be longer than one character")]
    InvalidTrimPrefix(String),

    #[error("no_trim and trim_prefix are mutually exclusive")]
    ConflictingRewritePolicy,

    #[error("url_cache_timeout_ms must be a positive number of milliseconds")]
    InvalidCacheTimeout,

    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),

    #[error("invalid value for header {0:?}")]
    InvalidHeaderValue(String),

    #[error("mount_path {0:?} must start with '/' and be a literal path")]
    InvalidMountPath(String),
}

/// Validate a service configuration.
///
/// `env_domain` is used when the configuration has no domain of its own.
pub fn validate_service(
    config: &ServiceConfig,
    env_domain: Option<&str>,
) -> Result<ProxyOptions, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let service_id = ServiceId::new(config.service_id.trim());
    if service_id.is_none() {
        errors.push(ValidationError::MissingServiceId);
    }

    let domain = config
        .domain
        .as_deref()
        .or(env_domain)
        .and_then(|d| Domain::new(d.trim()));
    if domain.is_none() {
        errors.push(ValidationError::MissingDomain);
    }

    let rewrite = match (config.no_trim, config.trim_prefix.as_deref()) {
        (true, Some(_)) => {
            errors.push(ValidationError::ConflictingRewritePolicy);
            None
        }
        (true, None) => Some(RewritePolicy::NoTrim),
        (false, Some(prefix)) if is_valid_prefix(prefix) => {
            Some(RewritePolicy::TrimPrefix(prefix.to_string()))
        }
        (false, Some(prefix)) => {
            errors.push(ValidationError::InvalidTrimPrefix(prefix.to_string()));
            None
        }
        (false, None) => Some(RewritePolicy::Default),
    };

    let url_cache_timeout = match config.url_cache_timeout_ms {
        Some(0) => {
            errors.push(ValidationError::InvalidCacheTimeout);
            DEFAULT_URL_CACHE_TIMEOUT
        }
        Some(ms) => Duration::from_millis(ms),
        None => DEFAULT_URL_CACHE_TIMEOUT,
    };

    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let Ok(header_name) = HeaderName::try_from(name.as_str()) else {
            errors.push(ValidationError::InvalidHeaderName(name.clone()));
            continue;
        };
        match HeaderValue::from_str(value) {
            Ok(header_value) => {
                headers.insert(header_name, header_value);
            }
            Err(_) => errors.push(ValidationError::InvalidHeaderValue(name.clone())),
        }
    }

    if !is_valid_mount_path(&config.mount_path) {
        errors.push(ValidationError::InvalidMountPath(config.mount_path.clone()));
    }

    match (service_id, domain, rewrite) {
        (Some(service_id), Some(domain), Some(rewrite)) if errors.is_empty() => Ok(ProxyOptions {
            service_id,
            domain,
            rewrite,
            url_cache_timeout,
            headers,
            rewrite_host_header: config.rewrite_host_header,
            mount_path: normalize_mount_path(&config.mount_path),
        }),
        _ => Err(errors),
    }
}

/// Route parameters and wildcards would be interpreted by the router.
fn is_valid_mount_path(path: &str) -> bool {
    path.starts_with('/') && !path.contains(['{', '}', '*'])
}

fn is_valid_prefix(prefix: &str) -> bool {
    prefix.len() > 1 && prefix.starts_with('/') && !prefix.ends_with('/')
}

fn normalize_mount_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
