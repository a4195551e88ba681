//! Post feed server: a small social post API whose writes are pushed to every
//! connected WebSocket client in real time.

use log::*;
use migration::{Migrator, MigratorTrait};
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!(
        "Starting post_feed_rs [{}] in {} mode",
        env!("CARGO_PKG_VERSION"),
        config.runtime_env()
    );

    if config.jwt_secret().is_none() {
        warn!("No JWT secret configured, login and protected endpoints will fail");
    }

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = Migrator::up(db.as_ref(), None).await {
        error!("Failed to run database migrations: {e}");
        std::process::exit(1);
    }

    let app_state = match AppState::with_new_hub(config, &db) {
        Ok(app_state) => app_state,
        Err(e) => {
            error!("Failed to start the WebSocket hub: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped with an error: {e}");
        std::process::exit(1);
    }

    info!("Server shut down cleanly");
}
