//! Service identity types and resolver error definitions.

use std::fmt;

use thiserror::Error;

/// Opaque, non-empty identifier of a backend service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceId(String);

impl ServiceId {
    /// Returns `None` for an empty identifier.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        (!id.is_empty()).then_some(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-empty hosting domain used to scope resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain(String);

impl Domain {
    /// Returns `None` for an empty domain.
    pub fn new(domain: impl Into<String>) -> Option<Self> {
        let domain = domain.into();
        (!domain.is_empty()).then_some(Self(domain))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a resolver is asked to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLocator {
    pub service_id: ServiceId,
    pub domain: Domain,
}

impl ServiceLocator {
    pub fn new(service_id: ServiceId, domain: Domain) -> Self {
        Self { service_id, domain }
    }
}

/// Errors a [`ResolverClient`](super::ResolverClient) can report.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The directory has no entry for the service.
    #[error("no url registered for service {service_id} on {domain}")]
    NotFound { service_id: String, domain: String },

    /// The directory returned something that is not a usable base URL.
    #[error("invalid service url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The directory could not be reached or answered with an error.
    #[error("{0}")]
    Unavailable(String),
}
