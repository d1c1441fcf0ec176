// BackupError -> HTTP response mapping
use crate::domain::error::BackupError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub struct ApiError(pub BackupError);

impl From<BackupError> for ApiError {
    fn from(error: BackupError) -> Self {
        Self(error)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            BackupError::InputInvalid(_) => StatusCode::BAD_REQUEST,
            BackupError::BackupNotFound(_) | BackupError::DashboardNotFound(_) => StatusCode::NOT_FOUND,
            BackupError::InvalidDocument { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            BackupError::PersistenceFailed(_) | BackupError::BackupFailed { .. } | BackupError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.0.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
