//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_service, ValidationError};

/// Fallback for `[service].domain`.
pub const DOMAIN_ENV: &str = "SERVICE_PROXY_DOMAIN";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] rustls::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    let config: ProxyConfig = toml::from_str(content)?;

    let env_domain = domain_from_env();
    validate_service(&config.service, env_domain.as_deref()).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// The domain from `SERVICE_PROXY_DOMAIN`, if set.
pub fn domain_from_env() -> Option<String> {
    std::env::var(DOMAIN_ENV).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let config = parse_config(
            r#"
            [service]
            service_id = "abc123"
            domain = "some.domain.com"
            no_trim = true
            "#,
        )
        .unwrap();
        assert_eq!(config.service.service_id, "abc123");
        assert!(config.service.no_trim);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[service\nservice_id = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_message() {
        let err = parse_config(
            r#"
            [service]
            service_id = ""
            domain = "some.domain.com"
            "#,
        )
        .unwrap_err();
        match &err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, &vec![ValidationError::MissingServiceId]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("Validation failed: service_id is required"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
