//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → middleware/service_proxy.rs (resolve target URL)
//!     → routing::rewrite (outbound path)
//!     → forward.rs (send to backend, stream response)
//!     → response.rs (strip hop-by-hop headers, error responses)
//!     → Send to client
//! ```

pub mod forward;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardError, Forwarder};
pub use middleware::{service_proxy_middleware, ServiceProxy};
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::resolution_failure_handler;
pub use server::HttpServer;
