// HTTP request handlers
use crate::application::backup_service::{BackupListing, BackupReceipt, RestoreReceipt};
use crate::domain::dashboard_id::DEFAULT_DASHBOARD_ID;
use crate::domain::error::BackupError;
use crate::presentation::app_state::AppState;
use crate::presentation::error_response::ApiError;
use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBackupRequest {
    pub dashboard_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestoreBackupRequest {
    pub dashboard_id: Option<String>,
    pub backup_file: Option<String>,
}

/// An empty body takes every default; anything else must be a well-formed request
fn parse_request<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        ApiError(BackupError::InputInvalid(format!("invalid request body: {}", e)))
    })
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// `create_backup` command; the body may be omitted entirely
pub async fn create_backup(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<BackupReceipt>, ApiError> {
    let request: CreateBackupRequest = parse_request(&body)?;
    let dashboard_id = request.dashboard_id.as_deref().unwrap_or(DEFAULT_DASHBOARD_ID);
    let receipt = state.backup_service.create_backup(dashboard_id).await?;
    Ok(Json(receipt))
}

/// `restore_backup` command
pub async fn restore_backup(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<RestoreReceipt>, ApiError> {
    let request: RestoreBackupRequest = parse_request(&body)?;
    let dashboard_id = request.dashboard_id.as_deref().unwrap_or(DEFAULT_DASHBOARD_ID);
    let backup_file = request.backup_file.as_deref().filter(|name| !name.is_empty());
    let receipt = state
        .backup_service
        .restore_backup(dashboard_id, backup_file)
        .await?;
    Ok(Json(receipt))
}

/// List the backups of a dashboard, newest first
pub async fn list_backups(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BackupListing>>, ApiError> {
    Ok(Json(state.backup_service.list_backups(&id).await?))
}

/// The configuration the host currently has for a dashboard
pub async fn current_config(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let resolved = state.backup_service.current_config(&id).await?;
    Ok(Json(json!({
        "dashboard_id": id,
        "source": resolved.provider,
        "config": resolved.config.into_value(),
    })))
}
