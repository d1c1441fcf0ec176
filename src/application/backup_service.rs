// Backup service - Snapshot, restore and discovery of dashboard backups
use crate::application::best_effort::notify_best_effort;
use crate::application::dashboard_locks::DashboardLocks;
use crate::application::host::{HostApi, HostState};
use crate::application::resolver::{ConfigResolver, Resolved};
use crate::application::writer::ConfigWriter;
use crate::domain::backup::{format_timestamp, select_latest, BackupArtifact, BackupEncoding};
use crate::domain::dashboard_config::DashboardConfig;
use crate::domain::dashboard_id::DashboardId;
use crate::domain::error::BackupError;
use crate::domain::events::BackupEvent;
use crate::infrastructure::backup_directory::BackupDirectory;
use crate::infrastructure::persisted_store::PersistedStore;
use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

#[derive(Debug, Clone, Serialize)]
pub struct BackupReceipt {
    pub dashboard_id: String,
    pub backup_file: String,
    pub derived_file: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RestoreReceipt {
    pub dashboard_id: String,
    pub backup_file: String,
    pub encoding: BackupEncoding,
    /// Sink that accepted a derived restore; raw restores bypass the sinks
    pub sink: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupListing {
    pub backup_file: String,
    pub encoding: BackupEncoding,
    pub created: String,
}

#[derive(Clone)]
pub struct BackupService {
    host: Arc<dyn HostApi>,
    store: PersistedStore,
    backups: BackupDirectory,
    resolver: ConfigResolver,
    writer: ConfigWriter,
    locks: Arc<DashboardLocks>,
    clock: Clock,
}

impl BackupService {
    pub fn new(
        host: Arc<dyn HostApi>,
        store: PersistedStore,
        backups: BackupDirectory,
        resolver: ConfigResolver,
        writer: ConfigWriter,
    ) -> Self {
        Self {
            host,
            store,
            backups,
            resolver,
            writer,
            locks: Arc::new(DashboardLocks::new()),
            clock: Arc::new(|| Local::now().naive_local().trunc_subsecs(0)),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Write a raw and a derived artifact of the dashboard's storage entry
    pub async fn create_backup(&self, dashboard_id: &str) -> Result<BackupReceipt, BackupError> {
        let result = match DashboardId::parse(dashboard_id) {
            Ok(id) => self.snapshot(&id).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(receipt) => {
                tracing::info!(
                    "Created backup of dashboard {}: {}",
                    receipt.dashboard_id,
                    receipt.backup_file
                );
                self.publish(BackupEvent::BackupCreated {
                    dashboard_id: receipt.dashboard_id.clone(),
                    backup_file: receipt.backup_file.clone(),
                    timestamp: receipt.timestamp.clone(),
                })
                .await;
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!("Failed to create backup of {}: {}", dashboard_id, e);
                self.publish(BackupEvent::BackupFailed {
                    dashboard_id: dashboard_id.to_string(),
                    error: e.to_string(),
                })
                .await;
                Err(e)
            }
        }
    }

    /// Restore `backup_file`, or the newest backup of the dashboard when none is named
    pub async fn restore_backup(
        &self,
        dashboard_id: &str,
        backup_file: Option<&str>,
    ) -> Result<RestoreReceipt, BackupError> {
        let result = match DashboardId::parse(dashboard_id) {
            Ok(id) => self.restore(&id, backup_file).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(receipt) => {
                tracing::info!(
                    "Restored dashboard {} from backup: {}",
                    receipt.dashboard_id,
                    receipt.backup_file
                );
                self.publish(BackupEvent::BackupRestored {
                    dashboard_id: receipt.dashboard_id.clone(),
                    backup_file: receipt.backup_file.clone(),
                })
                .await;
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!("Failed to restore backup of {}: {}", dashboard_id, e);
                self.publish(BackupEvent::RestoreFailed {
                    dashboard_id: dashboard_id.to_string(),
                    backup_file: backup_file.map(str::to_string),
                    error: e.to_string(),
                })
                .await;
                Err(e)
            }
        }
    }

    /// Every backup of the dashboard, newest first
    pub async fn list_backups(&self, dashboard_id: &str) -> Result<Vec<BackupListing>, BackupError> {
        let id = DashboardId::parse(dashboard_id)?;
        let artifacts = self.backups.list(&id).await?;
        Ok(artifacts
            .iter()
            .map(|artifact| BackupListing {
                backup_file: artifact.file_name(),
                encoding: artifact.encoding,
                created: artifact.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            })
            .collect())
    }

    /// The dashboard's configuration as the host currently sees it
    pub async fn current_config(&self, dashboard_id: &str) -> Result<Resolved, BackupError> {
        let id = DashboardId::parse(dashboard_id)?;
        let state = self.host_state().await;
        self.resolver.resolve(&id, &state).await
    }

    async fn snapshot(&self, id: &DashboardId) -> Result<BackupReceipt, BackupError> {
        let failed = |reason: String| BackupError::BackupFailed {
            dashboard_id: id.to_string(),
            reason,
        };
        let _guard = self.locks.lock(id).await;

        let entry = self.store.locate(id).await;
        let bytes = match tokio::fs::read(&entry).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(failed(format!(
                    "dashboard storage entry not found at {}",
                    entry.display()
                )));
            }
            Err(e) => return Err(failed(format!("could not read {}: {}", entry.display(), e))),
        };
        let yaml = PersistedStore::parse_data(&bytes)
            .and_then(|config| Ok(config.to_yaml()?))
            .map_err(|e| failed(format!("{:#}", e)))?;

        let timestamp = (self.clock)();
        let raw = BackupArtifact::new(id.clone(), timestamp, BackupEncoding::Raw);
        let derived = BackupArtifact::new(id.clone(), timestamp, BackupEncoding::Derived);

        self.backups
            .create(&raw, &bytes)
            .await
            .map_err(|e| failed(format!("could not write {}: {}", raw.file_name(), e)))?;

        if let Err(e) = self.backups.create(&derived, yaml.as_bytes()).await {
            // all-or-nothing: drop the raw half of the pair
            if let Err(cleanup) = self.backups.remove(&raw).await {
                tracing::warn!("Could not remove partial backup {}: {}", raw.file_name(), cleanup);
            }
            return Err(failed(format!("could not write {}: {}", derived.file_name(), e)));
        }

        Ok(BackupReceipt {
            dashboard_id: id.to_string(),
            backup_file: raw.file_name(),
            derived_file: derived.file_name(),
            timestamp: format_timestamp(&timestamp),
        })
    }

    async fn restore(&self, id: &DashboardId, backup_file: Option<&str>) -> Result<RestoreReceipt, BackupError> {
        let _guard = self.locks.lock(id).await;

        let (file_name, path, encoding) = match backup_file {
            Some(name) => {
                let (path, encoding) = self.backups.resolve_named(name).await?;
                (name.to_string(), path, encoding)
            }
            None => {
                let artifacts = self.backups.list(id).await?;
                let latest = select_latest(&artifacts)
                    .ok_or_else(|| BackupError::BackupNotFound(format!("no backups for dashboard {}", id)))?;
                (latest.file_name(), self.backups.path_of(latest), latest.encoding)
            }
        };

        let sink = match encoding {
            BackupEncoding::Raw => {
                self.restore_raw(id, &file_name, &path).await?;
                None
            }
            BackupEncoding::Derived => Some(self.restore_derived(id, &file_name, &path).await?),
        };

        Ok(RestoreReceipt {
            dashboard_id: id.to_string(),
            backup_file: file_name,
            encoding,
            sink,
        })
    }

    async fn restore_raw(&self, id: &DashboardId, file_name: &str, path: &Path) -> Result<(), BackupError> {
        let bytes = tokio::fs::read(path).await?;
        // Refuse to put something into host storage that the host could not load
        PersistedStore::parse_data(&bytes).map_err(|e| BackupError::InvalidDocument {
            file: file_name.to_string(),
            message: format!("{:#}", e),
        })?;
        self.writer.restore_raw(id, &bytes).await?;
        Ok(())
    }

    async fn restore_derived(
        &self,
        id: &DashboardId,
        file_name: &str,
        path: &Path,
    ) -> Result<&'static str, BackupError> {
        let invalid = |message: String| BackupError::InvalidDocument {
            file: file_name.to_string(),
            message,
        };
        let bytes = tokio::fs::read(path).await?;
        let text = std::str::from_utf8(&bytes).map_err(|e| invalid(e.to_string()))?;
        let config = DashboardConfig::from_yaml(text).map_err(|e| invalid(e.to_string()))?;
        let state = self.host_state().await;
        self.writer.write(id, &config, &state).await
    }

    async fn host_state(&self) -> HostState {
        match self.host.snapshot().await {
            Ok(state) => state,
            Err(e) => {
                tracing::debug!("Host state unavailable, continuing without it: {:#}", e);
                HostState::default()
            }
        }
    }

    /// Event on the bus plus a transient message; neither may fail the operation
    async fn publish(&self, event: BackupEvent) {
        notify_best_effort(
            "event notification",
            self.host.fire_event(&event.event_type(), event.payload()),
        )
        .await;
        let (title, message) = event.message();
        notify_best_effort(
            "persistent notification",
            self.host.create_notification(title, &message),
        )
        .await;
    }
}
