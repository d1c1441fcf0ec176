// Configuration sinks, in writer priority order
use crate::application::best_effort::notify_best_effort;
use crate::application::config_chain::ConfigSink;
use crate::application::host::{call_bounded, url_path, HostApi, HostState};
use crate::domain::dashboard_config::DashboardConfig;
use crate::domain::dashboard_id::DashboardId;
use crate::infrastructure::persisted_store::{backup_sibling, write_replacing, PersistedStore};
use crate::infrastructure::storage_paths::StoragePaths;
use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// The standard persistence chain, highest priority first
pub fn standard_sinks(host: Arc<dyn HostApi>, store: PersistedStore, wait: Duration) -> Vec<Arc<dyn ConfigSink>> {
    let paths = store.paths().clone();
    vec![
        Arc::new(BusSaveSink {
            host: host.clone(),
            wait,
        }),
        Arc::new(RegistrySink { host: host.clone() }),
        Arc::new(StorageEntrySink {
            store,
            host: host.clone(),
            wait,
        }),
        Arc::new(LegacyConfigSink { paths }),
        Arc::new(UserDataSink { host, wait }),
    ]
}

/// Host's own save operation over the service bus
pub struct BusSaveSink {
    host: Arc<dyn HostApi>,
    wait: Duration,
}

#[async_trait]
impl ConfigSink for BusSaveSink {
    fn name(&self) -> &'static str {
        "service_bus"
    }

    async fn store(&self, dashboard_id: &DashboardId, config: &DashboardConfig, _state: &HostState) -> anyhow::Result<()> {
        call_bounded(
            self.host.as_ref(),
            self.wait,
            "lovelace",
            "save_config",
            json!({ "url_path": url_path(dashboard_id), "config": config.as_value() }),
        )
        .await
    }
}

pub struct RegistrySink {
    host: Arc<dyn HostApi>,
}

#[async_trait]
impl ConfigSink for RegistrySink {
    fn name(&self) -> &'static str {
        "dashboard_registry"
    }

    async fn store(&self, dashboard_id: &DashboardId, config: &DashboardConfig, state: &HostState) -> anyhow::Result<()> {
        if !state.registry.contains_key(dashboard_id.as_str()) {
            anyhow::bail!("dashboard {} is not in the registry", dashboard_id);
        }
        self.host
            .save_registry_dashboard(dashboard_id.as_str(), config.as_value())
            .await
    }
}

/// Read-modify-write of the storage entry's `data` field
pub struct StorageEntrySink {
    store: PersistedStore,
    host: Arc<dyn HostApi>,
    wait: Duration,
}

#[async_trait]
impl ConfigSink for StorageEntrySink {
    fn name(&self) -> &'static str {
        "storage_entry"
    }

    async fn store(&self, dashboard_id: &DashboardId, config: &DashboardConfig, _state: &HostState) -> anyhow::Result<()> {
        let path = self.store.locate(dashboard_id).await;
        if !tokio::fs::try_exists(&path).await? {
            anyhow::bail!("no storage entry at {}", path.display());
        }
        self.store.replace_data(&path, config).await?;

        let host = self.host.as_ref();
        let reloaded = notify_best_effort(
            "lovelace resource reload",
            call_bounded(host, self.wait, "lovelace", "reload_resources", json!({})),
        )
        .await;
        if !reloaded {
            notify_best_effort(
                "frontend theme reload",
                call_bounded(host, self.wait, "frontend", "reload_themes", json!({})),
            )
            .await;
        }
        Ok(())
    }
}

/// `ui-lovelace.yaml`, default dashboard only
pub struct LegacyConfigSink {
    paths: StoragePaths,
}

#[async_trait]
impl ConfigSink for LegacyConfigSink {
    fn name(&self) -> &'static str {
        "legacy_config_file"
    }

    async fn store(&self, dashboard_id: &DashboardId, config: &DashboardConfig, _state: &HostState) -> anyhow::Result<()> {
        if !dashboard_id.is_default() {
            anyhow::bail!("only the default dashboard lives in {}", self.paths.legacy_config_file().display());
        }
        let path = self.paths.legacy_config_file();
        if !tokio::fs::try_exists(&path).await? {
            anyhow::bail!("no legacy config at {}", path.display());
        }
        let yaml = config.to_yaml()?;
        backup_sibling(&path).await?;
        write_replacing(&path, yaml.as_bytes())
            .await
            .with_context(|| format!("could not write {}", path.display()))
    }
}

/// Frontend user data, keyed per dashboard
pub struct UserDataSink {
    host: Arc<dyn HostApi>,
    wait: Duration,
}

#[async_trait]
impl ConfigSink for UserDataSink {
    fn name(&self) -> &'static str {
        "frontend_user_data"
    }

    async fn store(&self, dashboard_id: &DashboardId, config: &DashboardConfig, _state: &HostState) -> anyhow::Result<()> {
        call_bounded(
            self.host.as_ref(),
            self.wait,
            "frontend",
            "set_user_data",
            json!({
                "key": format!("dashboard_{}", dashboard_id),
                "value": { "id": dashboard_id.as_str(), "config": config.as_value() },
            }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::writer::ConfigWriter;
    use crate::domain::error::BackupError;
    use crate::infrastructure::persisted_store::bak_path;
    use crate::test_support::{write_file, InMemoryHost};
    use serde_json::Value;
    use std::path::Path;

    fn writer(dir: &Path, host: Arc<InMemoryHost>) -> ConfigWriter {
        let store = PersistedStore::new(StoragePaths::new(dir));
        ConfigWriter::new(
            standard_sinks(host.clone(), store.clone(), Duration::from_millis(50)),
            store,
            host,
        )
    }

    fn id(raw: &str) -> DashboardId {
        DashboardId::parse(raw).unwrap()
    }

    fn config() -> DashboardConfig {
        DashboardConfig::new(json!({"views": [{"title": "Restored"}]}))
    }

    #[test]
    fn test_standard_order() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            writer(dir.path(), Arc::new(InMemoryHost::new())).sink_names(),
            [
                "service_bus",
                "dashboard_registry",
                "storage_entry",
                "legacy_config_file",
                "frontend_user_data",
            ]
        );
    }

    #[tokio::test]
    async fn test_bus_save_wins_when_available() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(InMemoryHost::new().with_service("lovelace.save_config"));

        let sink = writer(dir.path(), host.clone())
            .write(&id("energy"), &config(), &HostState::default())
            .await
            .unwrap();

        assert_eq!(sink, "service_bus");
        let calls = host.calls();
        assert_eq!(calls[0].0, "lovelace.save_config");
        assert_eq!(calls[0].1["url_path"], "energy");
        assert_eq!(calls[0].1["config"], json!({"views": [{"title": "Restored"}]}));
    }

    #[tokio::test]
    async fn test_registry_sink_requires_registered_id() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(InMemoryHost::new());
        let mut state = HostState::default();
        state.registry.insert("energy".to_string(), json!({"config": {}}));

        let sink = writer(dir.path(), host.clone())
            .write(&id("energy"), &config(), &state)
            .await
            .unwrap();

        assert_eq!(sink, "dashboard_registry");
        assert_eq!(host.registry_saves()[0].0, "energy");
    }

    #[tokio::test]
    async fn test_storage_sink_rewrites_data_and_tries_both_refreshes() {
        let dir = tempfile::tempdir().unwrap();
        let original = br#"{"version": 1, "key": "lovelace.dashboard_energy", "data": {"views": []}}"#;
        let entry = write_file(dir.path(), ".storage/lovelace.dashboard_energy", original);
        let host = Arc::new(InMemoryHost::new());

        let sink = writer(dir.path(), host.clone())
            .write(&id("energy"), &config(), &HostState::default())
            .await
            .unwrap();

        assert_eq!(sink, "storage_entry");
        let written: Value = serde_json::from_slice(&std::fs::read(&entry).unwrap()).unwrap();
        assert_eq!(written["version"], 1);
        assert_eq!(written["data"], json!({"views": [{"title": "Restored"}]}));
        assert_eq!(std::fs::read(bak_path(&entry)).unwrap(), original.to_vec());
        assert!(host.called("lovelace.reload_resources"));
        assert!(host.called("frontend.reload_themes"));
    }

    #[tokio::test]
    async fn test_storage_sink_skips_second_refresh_after_first_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), ".storage/lovelace", br#"{"data": {}}"#);
        let host = Arc::new(InMemoryHost::new().with_service("lovelace.reload_resources"));

        writer(dir.path(), host.clone())
            .write(&id("lovelace"), &config(), &HostState::default())
            .await
            .unwrap();

        assert!(host.called("lovelace.reload_resources"));
        assert!(!host.called("frontend.reload_themes"));
    }

    #[tokio::test]
    async fn test_legacy_yaml_sink_for_default_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = write_file(dir.path(), "ui-lovelace.yaml", b"title: Old\n");
        let host = Arc::new(InMemoryHost::new());

        let sink = writer(dir.path(), host)
            .write(&id("lovelace"), &config(), &HostState::default())
            .await
            .unwrap();

        assert_eq!(sink, "legacy_config_file");
        let text = std::fs::read_to_string(&legacy).unwrap();
        assert_eq!(DashboardConfig::from_yaml(&text).unwrap(), config());
        assert_eq!(std::fs::read(bak_path(&legacy)).unwrap(), b"title: Old\n".to_vec());
    }

    #[tokio::test]
    async fn test_user_data_is_last_resort() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "ui-lovelace.yaml", b"title: Old\n");
        let host = Arc::new(InMemoryHost::new().with_service("frontend.set_user_data"));

        let sink = writer(dir.path(), host.clone())
            .write(&id("energy"), &config(), &HostState::default())
            .await
            .unwrap();

        assert_eq!(sink, "frontend_user_data");
        let (_, data) = host
            .calls()
            .into_iter()
            .find(|(key, _)| key == "frontend.set_user_data")
            .unwrap();
        assert_eq!(data["key"], "dashboard_energy");
        assert_eq!(data["value"]["id"], "energy");
        // The legacy file belongs to the default dashboard and must be untouched
        assert_eq!(std::fs::read(dir.path().join("ui-lovelace.yaml")).unwrap(), b"title: Old\n".to_vec());
    }

    #[tokio::test]
    async fn test_nothing_accepts_the_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = writer(dir.path(), Arc::new(InMemoryHost::new()))
            .write(&id("energy"), &config(), &HostState::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BackupError::PersistenceFailed(_)));
    }
}
