// Writer - Persist a configuration so the host reflects it
use crate::application::best_effort::notify_best_effort;
use crate::application::config_chain::ConfigSink;
use crate::application::host::{url_path, HostApi, HostState};
use crate::domain::dashboard_config::DashboardConfig;
use crate::domain::dashboard_id::DashboardId;
use crate::domain::error::BackupError;
use crate::infrastructure::persisted_store::PersistedStore;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

/// Event the host's frontends listen to for dashboard reloads
pub const RELOAD_EVENT: &str = "lovelace_updated";

#[derive(Clone)]
pub struct ConfigWriter {
    sinks: Vec<Arc<dyn ConfigSink>>,
    store: PersistedStore,
    host: Arc<dyn HostApi>,
}

impl ConfigWriter {
    /// Sinks are tried in the order given, highest priority first
    pub fn new(sinks: Vec<Arc<dyn ConfigSink>>, store: PersistedStore, host: Arc<dyn HostApi>) -> Self {
        Self { sinks, store, host }
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Store `config` through the first sink that accepts it and return that sink's name
    pub async fn write(
        &self,
        dashboard_id: &DashboardId,
        config: &DashboardConfig,
        state: &HostState,
    ) -> Result<&'static str, BackupError> {
        let mut failures = Vec::with_capacity(self.sinks.len());

        for sink in &self.sinks {
            match sink.store(dashboard_id, config, state).await {
                Ok(()) => {
                    tracing::info!("Stored dashboard {} through {}", dashboard_id, sink.name());
                    self.signal_reload(dashboard_id).await;
                    return Ok(sink.name());
                }
                Err(e) => {
                    tracing::debug!("Sink {} failed for {}: {:#}", sink.name(), dashboard_id, e);
                    failures.push(format!("{}: {:#}", sink.name(), e));
                }
            }
        }

        tracing::error!(
            "Every sink failed for dashboard {}: {}",
            dashboard_id,
            failures.join("; ")
        );
        Err(BackupError::PersistenceFailed(dashboard_id.to_string()))
    }

    /// Overwrite the persisted entry byte-for-byte, keeping a `.bak` of what was there
    pub async fn restore_raw(&self, dashboard_id: &DashboardId, bytes: &[u8]) -> Result<PathBuf, BackupError> {
        let path = self.store.locate(dashboard_id).await;
        self.store.replace_bytes(&path, bytes).await?;
        tracing::info!("Replaced storage entry {} for {}", path.display(), dashboard_id);
        self.signal_reload(dashboard_id).await;
        Ok(path)
    }

    async fn signal_reload(&self, dashboard_id: &DashboardId) {
        notify_best_effort(
            "UI reload",
            self.host.fire_event(
                RELOAD_EVENT,
                json!({ "url_path": url_path(dashboard_id), "mode": "storage" }),
            ),
        )
        .await;
    }
}
