//! Route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{admin, health, verify};
use crate::state::AppState;

/// Create the main router with all routes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .merge(verify_routes())
        .merge(admin_routes())
}

/// Health check routes
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// Public verification form routes
fn verify_routes() -> Router<AppState> {
    Router::new()
        .route("/verify", get(verify::verify_page))
        .route("/verify", post(verify::submit_verification))
}

/// Admin routes
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/list", get(admin::list_users))
        .route("/admin/update", post(admin::admin_update))
}
