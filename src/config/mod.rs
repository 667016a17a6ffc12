//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + SERVICE_PROXY_DOMAIN
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyOptions (validated, immutable)
//!     → owned by one ServiceProxy
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A bad config fails construction; it never surfaces per request

pub mod loader;
pub mod options;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use options::{ProxyOptions, DEFAULT_URL_CACHE_TIMEOUT};
pub use schema::{ListenerConfig, ObservabilityConfig, ProxyConfig, ResolverConfig, ServiceConfig};
pub use validation::ValidationError;
