//! HTTP surface for the broker: publish, subscribe and health endpoints.

use log::*;
use tokio::net::TcpListener;

pub use service::AppState;

pub(crate) use error::Error;

mod controller;
mod error;
mod router;
mod sse;

pub use router::define_routes;

/// Bind the configured interface and port and serve the router until the process exits.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let server_url = format!(
        "{}:{}",
        app_state.config.interface(),
        app_state.config.port
    );

    let listener = TcpListener::bind(&server_url).await?;

    info!("Server starting... listening for connections on http://{server_url}");

    axum::serve(listener, router::define_routes(app_state)).await
}
