//! Server setup and initialization
//!
//! Wires configuration into the database pool, the membership portal
//! client, and the service context, then runs the Axum server.

use std::sync::Arc;

use axum::Router;
use scoutlink_common::{AppConfig, AppError};
use scoutlink_core::SnowflakeGenerator;
use scoutlink_db::{create_pool, PgUserRepository};
use scoutlink_extranet::ExtranetClient;
use scoutlink_service::{RunAsRegistry, ServiceContextBuilder};
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = create_router();
    let router = apply_middleware(router);
    router.with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let db_config = scoutlink_db::DatabaseConfig::from(&config.database);
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    scoutlink_db::run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("Schema migrations applied");

    let user_repo = Arc::new(PgUserRepository::new(pool.clone()));
    let verifier = Arc::new(ExtranetClient::new(&config.extranet)?);
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));
    let run_as = Arc::new(RunAsRegistry::from_config(&config.run_as));

    let service_context = ServiceContextBuilder::new()
        .user_repo(user_repo)
        .verifier(verifier)
        .snowflake_generator(snowflake_generator)
        .run_as(run_as)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, pool, config))
}

/// Run the HTTP server
pub async fn run_server(app: Router, address: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {address}: {e}")))?;

    info!("Server listening on http://{address}");

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let address = config.api.address();

    let state = create_app_state(config).await?;
    let app = create_app(state);

    run_server(app, &address).await
}
