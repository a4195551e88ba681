use config::Config;
use events::EventPublisher;
use hub::{Hub, HubConfig, HubDomainEventHandler};
use log::info;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;
use tokio::time::Duration;

pub mod config;
pub mod logging;

pub async fn init_database(config: &Config) -> Result<DatabaseConnection, DbErr> {
    info!(
        "Database pool config: max_connections={}, min_connections={}, \
         connect_timeout={}s, acquire_timeout={}s, idle_timeout={}s, max_lifetime={}s",
        config.db_max_connections,
        config.db_min_connections,
        config.db_connect_timeout_secs,
        config.db_acquire_timeout_secs,
        config.db_idle_timeout_secs,
        config.db_max_lifetime_secs,
    );

    let mut opt = ConnectOptions::new::<&str>(config.database_url());
    opt.max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .connect_timeout(Duration::from_secs(config.db_connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime_secs))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Info)
        .set_schema_search_path("post_feed"); // Setting default PostgreSQL schema

    let db = Database::connect(opt).await?;

    Ok(db)
}

// Service-level state shared by every request handler.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub database_connection: Arc<DatabaseConnection>,
    pub config: Config,
    pub hub: Hub,
    pub event_publisher: Arc<EventPublisher>,
}

impl AppState {
    /// Builds the state around an already running hub. Domain events published
    /// through `event_publisher` are broadcast by that hub.
    pub fn new(app_config: Config, db: &Arc<DatabaseConnection>, hub: Hub) -> Self {
        let event_publisher =
            EventPublisher::new().with_handler(Arc::new(HubDomainEventHandler::new(hub.clone())));

        Self {
            database_connection: Arc::clone(db),
            config: app_config,
            hub,
            event_publisher: Arc::new(event_publisher),
        }
    }

    /// Starts a hub configured from `app_config` and builds the state around it.
    /// Must be called from within a tokio runtime.
    pub fn with_new_hub(
        app_config: Config,
        db: &Arc<DatabaseConnection>,
    ) -> Result<Self, hub::Error> {
        let hub = Hub::start(HubConfig::from(&app_config))?;
        Ok(Self::new(app_config, db, hub))
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.database_connection.as_ref()
    }

    pub fn set_db_conn(&mut self, db: DatabaseConnection) {
        self.database_connection = Arc::new(db);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use hub::HubErrorKind;

    #[tokio::test]
    async fn hub_is_not_started_when_keepalive_does_not_outlast_pings() {
        let config = Config::try_parse_from([
            "post_feed_rs",
            "--ws-ping-interval-secs",
            "30",
            "--ws-keepalive-timeout-secs",
            "30",
        ])
        .unwrap();
        let db = Arc::new(DatabaseConnection::Disconnected);

        let err = AppState::with_new_hub(config, &db).err().unwrap();

        assert_eq!(err.error_kind, HubErrorKind::InvalidConfig);
    }
}
