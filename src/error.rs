//! Per-request proxy errors.

use std::sync::Arc;

use thiserror::Error;

use crate::resolver::{ResolveError, ServiceId};

/// Why a request could not be proxied.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The target URL could not be resolved; nothing was forwarded.
    #[error("failed to proxy req to service {service_id}: {source}")]
    Resolution {
        service_id: ServiceId,
        #[source]
        source: ResolveError,
    },
}

/// Request extension carrying a resolution failure to the next handler.
#[derive(Debug, Clone)]
pub struct ResolutionFailure(pub Arc<ProxyError>);

impl ResolutionFailure {
    pub fn new(error: ProxyError) -> Self {
        Self(Arc::new(error))
    }

    pub fn error(&self) -> &ProxyError {
        &self.0
    }
}
