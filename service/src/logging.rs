use crate::config::Config;
use log::LevelFilter;
use simplelog::{CombinedLogger, ConfigBuilder, SharedLogger, TermLogger};

/// Dependencies that are only logged at TRACE.
const NOISY_DEPENDENCIES: &[&str] = &[
    "sqlx",
    "sea_orm",
    "tower",
    "tracing",
    "hyper",
    "axum",
    "tungstenite",
    "tokio_tungstenite",
];

/// Module prefix of the WebSocket hub, which gets its own level.
const HUB_MODULE: &str = "hub";

pub struct Logger {}

impl Logger {
    /// Installs the global logger: one terminal sink for the application at
    /// `log_level_filter` and one for the hub at `hub_log_level_filter`.
    pub fn init_logger(config: &Config) {
        let loggers: Vec<Box<dyn SharedLogger>> = vec![
            TermLogger::new(
                config.log_level_filter,
                Self::app_log_config(config.log_level_filter),
                simplelog::TerminalMode::Mixed,
                simplelog::ColorChoice::Auto,
            ),
            TermLogger::new(
                Self::hub_level(config),
                Self::hub_log_config(),
                simplelog::TerminalMode::Mixed,
                simplelog::ColorChoice::Auto,
            ),
        ];

        CombinedLogger::init(loggers).expect("Failed to start simplelog");
    }

    fn hub_level(config: &Config) -> LevelFilter {
        config
            .hub_log_level_filter
            .unwrap_or(config.log_level_filter)
    }

    /// Everything except the hub. Noisy dependencies are dropped unless `level` is TRACE.
    fn app_log_config(level: LevelFilter) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();
        builder.add_filter_ignore_str(HUB_MODULE);

        if level != LevelFilter::Trace {
            for module in NOISY_DEPENDENCIES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }

    fn hub_log_config() -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();
        builder.add_filter_allow_str(HUB_MODULE);
        builder.build()
    }
}
