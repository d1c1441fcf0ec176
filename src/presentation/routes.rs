// Route table for the HTTP surface
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    create_backup, current_config, health_check, list_backups, restore_backup,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/services/create_backup", post(create_backup))
        .route("/services/restore_backup", post(restore_backup))
        .route("/dashboards/:id/backups", get(list_backups))
        .route("/dashboards/:id/config", get(current_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
