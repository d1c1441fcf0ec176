// Host storage entries: {"version": .., "data": {<dashboard config>}, ...}
use crate::domain::dashboard_config::DashboardConfig;
use crate::domain::dashboard_id::DashboardId;
use crate::infrastructure::storage_paths::StoragePaths;
use anyhow::Context;
use serde_json::Value;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PersistedStore {
    paths: StoragePaths,
}

impl PersistedStore {
    pub fn new(paths: StoragePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub async fn locate(&self, dashboard_id: &DashboardId) -> PathBuf {
        self.paths.locate_entry(dashboard_id).await
    }

    /// Extract the `data` field of a storage entry
    pub fn parse_data(bytes: &[u8]) -> anyhow::Result<DashboardConfig> {
        let entry: Value = serde_json::from_slice(bytes).context("storage entry is not valid JSON")?;
        let data = entry
            .get("data")
            .cloned()
            .context("storage entry has no data field")?;
        Ok(DashboardConfig::new(data))
    }

    pub async fn read_config(&self, path: &Path) -> anyhow::Result<DashboardConfig> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?;
        Self::parse_data(&bytes)
    }

    /// Swap the entry's `data` field, leaving every other field as it was
    pub async fn replace_data(&self, path: &Path, config: &DashboardConfig) -> anyhow::Result<()> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?;
        let mut entry: Value = serde_json::from_slice(&bytes).context("storage entry is not valid JSON")?;
        let fields = entry
            .as_object_mut()
            .context("storage entry is not a JSON object")?;
        fields.insert("data".to_string(), config.as_value().clone());

        backup_sibling(path).await?;
        let updated = serde_json::to_vec_pretty(&entry)?;
        write_replacing(path, &updated)
            .await
            .with_context(|| format!("could not write {}", path.display()))?;
        Ok(())
    }

    /// Overwrite the entry with `bytes` exactly
    pub async fn replace_bytes(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        backup_sibling(path).await?;
        write_replacing(path, bytes).await
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// `<file>.bak` next to `path`
pub fn bak_path(path: &Path) -> PathBuf {
    sibling(path, ".bak")
}

/// Stage `bytes` in a sibling and rename it over `path`; readers see the old or the new file, never a torn one
pub async fn write_replacing(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let staging = sibling(path, ".tmp");
    tokio::fs::write(&staging, bytes).await?;
    if let Err(e) = tokio::fs::rename(&staging, path).await {
        if let Err(cleanup) = tokio::fs::remove_file(&staging).await {
            tracing::warn!("Could not remove {}: {}", staging.display(), cleanup);
        }
        return Err(e);
    }
    Ok(())
}

/// Copy `path` to its `.bak` sibling, replacing an older one. No-op when `path` is absent.
pub async fn backup_sibling(path: &Path) -> std::io::Result<Option<PathBuf>> {
    if !tokio::fs::try_exists(path).await? {
        return Ok(None);
    }
    let bak = bak_path(path);
    tokio::fs::copy(path, &bak).await?;
    Ok(Some(bak))
}
