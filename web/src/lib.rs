use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use hub::Hub;
use log::*;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use self::error::{Error, Result};
pub use service::AppState;

mod controller;
mod error;
mod extractors;
mod middleware;
mod params;
pub mod router;
mod ws;

/// Header a REST client uses to name its own WebSocket connection so it is not
/// notified about its own writes.
pub(crate) const CONNECTION_ID_HEADER: &str = "x-connection-id";

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state.config.interface.as_deref().unwrap_or("127.0.0.1");
    let server_url = format!("{interface}:{}", app_state.config.port);

    let allowed_origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin}: {e}");
                None
            }
        })
        .collect();

    info!("CORS allowed origins: {allowed_origins:?}");

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::DELETE, Method::GET, Method::POST, Method::PUT])
        .allow_credentials(true)
        .allow_headers([
            AUTHORIZATION,
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static(CONNECTION_ID_HEADER),
        ])
        .allow_origin(allowed_origins);

    let listener = TcpListener::bind(&server_url).await?;
    info!("Server starting... listening for connections on http://{server_url}");

    let hub = app_state.hub.clone();

    axum::serve(listener, router::define_routes(app_state).layer(cors_layer))
        .with_graceful_shutdown(shutdown_signal(hub))
        .await
}

/// Resolves on Ctrl-C once every WebSocket has been closed, letting axum drain
/// the remaining HTTP requests.
async fn shutdown_signal(hub: Hub) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for the shutdown signal: {e}");
    }

    info!("Shutdown signal received, closing WebSocket connections");
    hub.shutdown().await;
    info!("WebSocket hub stopped");
}
