pub mod app_config;
pub mod monitor_config;

pub use app_config::{AppConfig, ConfigError, TelegramConfig, load_config, setup_resolver};
pub use monitor_config::MonitorConfig;
