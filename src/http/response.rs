//! Response handling and transformation.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers from backend responses
//! - Build the fixed responses the proxy answers with itself
//!
//! # Design Decisions
//! - Backend bodies are streamed, never buffered
//! - A forwarding failure is a plain-text 500 naming the original path
//! - A resolution failure is the host's call; the bundled handler uses 502

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::ResolutionFailure;

/// Headers meaningful only for a single transport hop.
pub const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    for name in listed.iter().map(String::as_str).chain(HOP_BY_HOP_HEADERS) {
        headers.remove(name);
    }
}

/// The response written when the backend cannot be reached.
pub fn forward_failure(original_path: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain")],
        format!("failed to proxy request to {original_path}"),
    )
        .into_response()
}

/// Default `next` handler behind the proxy middleware.
///
/// Answers `502` with the resolution error when the middleware attached one,
/// `404` otherwise.
pub async fn resolution_failure_handler(req: Request<Body>) -> Response {
    match req.extensions().get::<ResolutionFailure>() {
        Some(failure) => (
            StatusCode::BAD_GATEWAY,
            [(header::CONTENT_TYPE, "text/plain")],
            failure.error().to_string(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
