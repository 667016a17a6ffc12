//! Backend for trying the proxy locally.
//!
//! ```text
//! cargo run --example mock-service
//! SERVICE_PROXY_SERVICE_MAP='{"fakeServiceGuid":"http://127.0.0.1:8002"}' \
//!     cargo run -- --config demos/service-proxy.toml
//! curl http://127.0.0.1:8001/parent/things
//! ```

use axum::{extract::OriginalUri, routing::any, Router};
use tokio::net::TcpListener;

async fn serve(OriginalUri(uri): OriginalUri) -> String {
    tracing::info!(uri = %uri, "received request");
    format!("served url {uri} successfully!")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .route("/", any(serve))
        .route("/{*path}", any(serve));

    let listener = TcpListener::bind("127.0.0.1:8002").await?;
    tracing::info!(address = %listener.local_addr()?, "mock service listening");
    axum::serve(listener, app).await?;
    Ok(())
}
