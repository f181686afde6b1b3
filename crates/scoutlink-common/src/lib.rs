//! # scoutlink-common
//!
//! Shared utilities including configuration, error handling, retry backoff, and telemetry.

pub mod backoff;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use backoff::{retry_with_backoff, BackoffPolicy};
pub use config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, DiscordConfig, Environment,
    ExtranetConfig, RunAsConfig, ServerConfig, SnowflakeConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
