// Configuration providers, in resolver priority order
use crate::application::config_chain::ConfigProvider;
use crate::application::host::{request_bounded, url_path, HostApi, HostState};
use crate::domain::dashboard_config::DashboardConfig;
use crate::domain::dashboard_id::DashboardId;
use crate::infrastructure::persisted_store::PersistedStore;
use crate::infrastructure::storage_paths::StoragePaths;
use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// The standard lookup chain, highest priority first
pub fn standard_providers(
    host: Arc<dyn HostApi>,
    store: PersistedStore,
    wait: Duration,
) -> Vec<Arc<dyn ConfigProvider>> {
    let paths = store.paths().clone();
    vec![
        Arc::new(LovelaceHandleProvider),
        Arc::new(RuntimeStateProvider),
        Arc::new(RegistryProvider),
        Arc::new(BusProvider { host, wait }),
        Arc::new(StorageEntryProvider { store }),
        Arc::new(LegacyConfigProvider {
            paths: paths.clone(),
        }),
        Arc::new(FrontendStorageProvider),
        Arc::new(LegacyDashboardFileProvider { paths }),
        Arc::new(EmptyDashboardProvider),
    ]
}

/// `config` attribute of the entry for `dashboard_id` in one of the host state maps
fn embedded_config(entries: &HashMap<String, Value>, dashboard_id: &DashboardId) -> Option<DashboardConfig> {
    entries
        .get(dashboard_id.as_str())
        .and_then(|entry| entry.get("config"))
        .cloned()
        .map(DashboardConfig::new)
}

async fn read_yaml(path: &Path) -> anyhow::Result<Option<DashboardConfig>> {
    if !tokio::fs::try_exists(path).await? {
        return Ok(None);
    }
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("could not read {}", path.display()))?;
    let config = DashboardConfig::from_yaml(&text)
        .with_context(|| format!("invalid YAML in {}", path.display()))?;
    Ok(Some(config))
}

pub struct LovelaceHandleProvider;

#[async_trait]
impl ConfigProvider for LovelaceHandleProvider {
    fn name(&self) -> &'static str {
        "lovelace_handle"
    }

    async fn fetch(&self, dashboard_id: &DashboardId, state: &HostState) -> anyhow::Result<Option<DashboardConfig>> {
        Ok(embedded_config(&state.lovelace_handles, dashboard_id))
    }
}

pub struct RuntimeStateProvider;

#[async_trait]
impl ConfigProvider for RuntimeStateProvider {
    fn name(&self) -> &'static str {
        "runtime_state"
    }

    async fn fetch(&self, dashboard_id: &DashboardId, state: &HostState) -> anyhow::Result<Option<DashboardConfig>> {
        Ok(embedded_config(&state.runtime_states, dashboard_id))
    }
}

pub struct RegistryProvider;

#[async_trait]
impl ConfigProvider for RegistryProvider {
    fn name(&self) -> &'static str {
        "dashboard_registry"
    }

    async fn fetch(&self, dashboard_id: &DashboardId, state: &HostState) -> anyhow::Result<Option<DashboardConfig>> {
        Ok(embedded_config(&state.registry, dashboard_id))
    }
}

/// Asks the host for the config over its service bus
pub struct BusProvider {
    host: Arc<dyn HostApi>,
    wait: Duration,
}

#[async_trait]
impl ConfigProvider for BusProvider {
    fn name(&self) -> &'static str {
        "service_bus"
    }

    async fn fetch(&self, dashboard_id: &DashboardId, _state: &HostState) -> anyhow::Result<Option<DashboardConfig>> {
        let response = request_bounded(
            self.host.as_ref(),
            self.wait,
            "lovelace",
            "get_config",
            json!({ "url_path": url_path(dashboard_id) }),
        )
        .await?;

        // The response either wraps the config or is the config itself
        Ok(response.map(|mut value| {
            let config = value
                .as_object_mut()
                .and_then(|fields| fields.remove("config"))
                .unwrap_or(value);
            DashboardConfig::new(config)
        }))
    }
}

pub struct StorageEntryProvider {
    store: PersistedStore,
}

#[async_trait]
impl ConfigProvider for StorageEntryProvider {
    fn name(&self) -> &'static str {
        "storage_entry"
    }

    async fn fetch(&self, dashboard_id: &DashboardId, _state: &HostState) -> anyhow::Result<Option<DashboardConfig>> {
        let path = self.store.locate(dashboard_id).await;
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }
        self.store.read_config(&path).await.map(Some)
    }
}

/// `ui-lovelace.yaml`; only ever describes the default dashboard
pub struct LegacyConfigProvider {
    paths: StoragePaths,
}

#[async_trait]
impl ConfigProvider for LegacyConfigProvider {
    fn name(&self) -> &'static str {
        "legacy_config_file"
    }

    async fn fetch(&self, dashboard_id: &DashboardId, _state: &HostState) -> anyhow::Result<Option<DashboardConfig>> {
        if !dashboard_id.is_default() {
            return Ok(None);
        }
        read_yaml(&self.paths.legacy_config_file()).await
    }
}

/// Scans the browser-side storage blob for an entry carrying this dashboard's id
pub struct FrontendStorageProvider;

impl FrontendStorageProvider {
    fn find(blob: &Value, dashboard_id: &str) -> Option<Value> {
        if let Some(found) = blob.get("dashboards").and_then(|d| d.get(dashboard_id)) {
            return Some(found.clone());
        }
        Self::scan(blob, dashboard_id)
    }

    fn scan(value: &Value, dashboard_id: &str) -> Option<Value> {
        match value {
            Value::Object(fields) => {
                let matches_id = ["url_path", "id", "dashboard_id"]
                    .iter()
                    .any(|key| fields.get(*key).and_then(Value::as_str) == Some(dashboard_id));
                if matches_id {
                    if let Some(config) = fields.get("config") {
                        return Some(config.clone());
                    }
                }
                fields.values().find_map(|v| Self::scan(v, dashboard_id))
            }
            Value::Array(items) => items.iter().find_map(|v| Self::scan(v, dashboard_id)),
            _ => None,
        }
    }
}

#[async_trait]
impl ConfigProvider for FrontendStorageProvider {
    fn name(&self) -> &'static str {
        "frontend_storage"
    }

    async fn fetch(&self, dashboard_id: &DashboardId, state: &HostState) -> anyhow::Result<Option<DashboardConfig>> {
        Ok(state
            .frontend_storage
            .as_ref()
            .and_then(|blob| Self::find(blob, dashboard_id.as_str()))
            .map(DashboardConfig::new))
    }
}

pub struct LegacyDashboardFileProvider {
    paths: StoragePaths,
}

#[async_trait]
impl ConfigProvider for LegacyDashboardFileProvider {
    fn name(&self) -> &'static str {
        "legacy_dashboard_file"
    }

    async fn fetch(&self, dashboard_id: &DashboardId, _state: &HostState) -> anyhow::Result<Option<DashboardConfig>> {
        for path in self.paths.legacy_dashboard_files(dashboard_id) {
            if let Some(config) = read_yaml(&path).await? {
                return Ok(Some(config));
            }
        }
        Ok(None)
    }
}

/// Last resort: a single empty view
pub struct EmptyDashboardProvider;

#[async_trait]
impl ConfigProvider for EmptyDashboardProvider {
    fn name(&self) -> &'static str {
        "empty_dashboard"
    }

    async fn fetch(&self, _dashboard_id: &DashboardId, _state: &HostState) -> anyhow::Result<Option<DashboardConfig>> {
        Ok(Some(DashboardConfig::empty_dashboard()))
    }
}
