// Application state for HTTP handlers
use crate::application::backup_service::BackupService;

#[derive(Clone)]
pub struct AppState {
    pub backup_service: BackupService,
}
