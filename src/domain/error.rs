// Errors surfaced to callers of the backup service
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Dashboard not found: {0}")]
    DashboardNotFound(String),

    #[error("Backup file not found: {0}")]
    BackupNotFound(String),

    #[error("Invalid YAML in backup file {file}: {message}")]
    InvalidDocument { file: String, message: String },

    #[error("Could not restore dashboard {0}")]
    PersistenceFailed(String),

    #[error("Failed to create backup of dashboard {dashboard_id}: {reason}")]
    BackupFailed { dashboard_id: String, reason: String },

    #[error("Invalid input: {0}")]
    InputInvalid(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
