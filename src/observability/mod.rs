//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resolver (cache lookups, directory calls)
//! forward  (upstream status, latency, transport failures)
//!     → logging.rs (tracing events on stdout, filtered by RUST_LOG)
//!     → metrics.rs (service_proxy_* counters and histogram)
//!     → Prometheus scrape endpoint when metrics_enabled
//! ```
//!
//! Without an installed exporter the metric macros are no-ops.

pub mod logging;
pub mod metrics;
