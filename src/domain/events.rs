// Notifications emitted on the host's event bus
use serde_json::{json, Value};

pub const DOMAIN: &str = "dashboard_backup";
pub const TITLE: &str = "Dashboard Backup";
pub const ERROR_TITLE: &str = "Dashboard Backup Error";

#[derive(Debug, Clone, PartialEq)]
pub enum BackupEvent {
    BackupCreated {
        dashboard_id: String,
        backup_file: String,
        timestamp: String,
    },
    BackupFailed {
        dashboard_id: String,
        error: String,
    },
    BackupRestored {
        dashboard_id: String,
        backup_file: String,
    },
    RestoreFailed {
        dashboard_id: String,
        backup_file: Option<String>,
        error: String,
    },
}

impl BackupEvent {
    pub fn event_type(&self) -> String {
        let name = match self {
            BackupEvent::BackupCreated { .. } => "backup_created",
            BackupEvent::BackupFailed { .. } => "backup_failed",
            BackupEvent::BackupRestored { .. } => "backup_restored",
            BackupEvent::RestoreFailed { .. } => "restore_failed",
        };
        format!("{}_{}", DOMAIN, name)
    }

    pub fn payload(&self) -> Value {
        match self {
            BackupEvent::BackupCreated {
                dashboard_id,
                backup_file,
                timestamp,
            } => json!({
                "dashboard_id": dashboard_id,
                "backup_file": backup_file,
                "timestamp": timestamp,
            }),
            BackupEvent::BackupFailed { dashboard_id, error } => json!({
                "dashboard_id": dashboard_id,
                "error": error,
            }),
            BackupEvent::BackupRestored {
                dashboard_id,
                backup_file,
            } => json!({
                "dashboard_id": dashboard_id,
                "backup_file": backup_file,
            }),
            BackupEvent::RestoreFailed {
                dashboard_id,
                backup_file,
                error,
            } => json!({
                "dashboard_id": dashboard_id,
                "backup_file": backup_file,
                "error": error,
            }),
        }
    }

    /// Title and text of the transient UI message mirroring this event
    pub fn message(&self) -> (&'static str, String) {
        match self {
            BackupEvent::BackupCreated { dashboard_id, .. } => (
                TITLE,
                format!("Successfully created backup of dashboard '{}'.", dashboard_id),
            ),
            BackupEvent::BackupFailed { dashboard_id, error } => (
                ERROR_TITLE,
                format!("Failed to create backup of dashboard '{}': {}", dashboard_id, error),
            ),
            BackupEvent::BackupRestored { dashboard_id, .. } => (
                TITLE,
                format!("Successfully restored dashboard '{}' from backup.", dashboard_id),
            ),
            BackupEvent::RestoreFailed { dashboard_id, error, .. } => (
                ERROR_TITLE,
                format!("Failed to restore dashboard '{}': {}", dashboard_id, error),
            ),
        }
    }
}
