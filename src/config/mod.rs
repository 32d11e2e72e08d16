pub mod config;

pub use self::config::{
    load_config_from, AdminConfig, AppConfig, BatchConfig, DatabaseConfig, ScraperConfig,
    ServerConfig,
};
