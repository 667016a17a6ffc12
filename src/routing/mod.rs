//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (original path, mount-relative path)
//!     → rewrite.rs (apply the configured RewritePolicy)
//!     → Return: outbound path-and-query for the backend
//! ```
//!
//! # Design Decisions
//! - Policy chosen once at startup, immutable at runtime
//! - Prefix matching only, no regex
//! - Deterministic: same input always yields the same path
//! - A non-matching prefix is a no-op, never an error

pub mod rewrite;

pub use rewrite::RewritePolicy;
