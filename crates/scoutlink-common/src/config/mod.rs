//! Configuration loading

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, DiscordConfig, Environment,
    ExtranetConfig, RunAsConfig, ServerConfig, SnowflakeConfig,
};
