//! Middleware for the host router.

pub mod service_proxy;

pub use service_proxy::{service_proxy_middleware, ServiceProxy};
