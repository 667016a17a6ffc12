//! Process lifecycle.
//!
//! ```text
//! SIGINT / SIGTERM → Shutdown::trigger
//!     → HttpServer::run stops accepting, drains in-flight requests
//!     → URL cache invalidated, expiry timer cancelled
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
