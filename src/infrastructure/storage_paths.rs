// Dashboard id -> host storage file mapping
use crate::domain::dashboard_id::{DashboardId, DEFAULT_DASHBOARD_ID};
use std::path::{Path, PathBuf};

pub const STORAGE_DIR: &str = ".storage";
pub const DASHBOARD_PREFIX: &str = "dashboard_";
pub const LEGACY_CONFIG_FILE: &str = "ui-lovelace.yaml";
pub const LEGACY_DASHBOARDS_DIR: &str = "dashboards";

#[derive(Debug, Clone)]
pub struct StoragePaths {
    config_dir: PathBuf,
}

impl StoragePaths {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.config_dir.join(STORAGE_DIR)
    }

    /// `lovelace` for the default dashboard, `lovelace.dashboard_{id}` otherwise
    pub fn canonical_entry(&self, dashboard_id: &DashboardId) -> PathBuf {
        if dashboard_id.is_default() {
            return self.storage_dir().join(DEFAULT_DASHBOARD_ID);
        }
        let id = dashboard_id.as_str();
        let name = if id.starts_with(DASHBOARD_PREFIX) {
            format!("{}.{}", DEFAULT_DASHBOARD_ID, id)
        } else {
            format!("{}.{}{}", DEFAULT_DASHBOARD_ID, DASHBOARD_PREFIX, id)
        };
        self.storage_dir().join(name)
    }

    /// Canonical path first, then the historical naming variants in lookup order
    pub fn entry_candidates(&self, dashboard_id: &DashboardId) -> Vec<PathBuf> {
        let mut candidates = vec![self.canonical_entry(dashboard_id)];
        if dashboard_id.is_default() {
            return candidates;
        }

        let id = dashboard_id.as_str();
        let bare = id.strip_prefix(DASHBOARD_PREFIX).unwrap_or(id);
        let names = [
            format!("{}.{}", DEFAULT_DASHBOARD_ID, id),
            format!("{}.{}", DEFAULT_DASHBOARD_ID, bare),
            format!("{}_{}", DEFAULT_DASHBOARD_ID, bare),
            format!("{}-{}", DEFAULT_DASHBOARD_ID, bare),
            format!("{}.{}{}", DEFAULT_DASHBOARD_ID, DASHBOARD_PREFIX, bare.replace('-', "_")),
            format!("{}.{}", DEFAULT_DASHBOARD_ID, bare.replace('-', "_")),
        ];
        for name in names {
            let path = self.storage_dir().join(name);
            if !candidates.contains(&path) {
                candidates.push(path);
            }
        }
        candidates
    }

    /// First candidate that exists on disk, or the canonical path when none does
    pub async fn locate_entry(&self, dashboard_id: &DashboardId) -> PathBuf {
        let candidates = self.entry_candidates(dashboard_id);
        for candidate in &candidates {
            if tokio::fs::try_exists(candidate).await.unwrap_or(false) {
                return candidate.clone();
            }
        }
        candidates
            .into_iter()
            .next()
            .unwrap_or_else(|| self.canonical_entry(dashboard_id))
    }

    /// Flat YAML configuration of the default dashboard
    pub fn legacy_config_file(&self) -> PathBuf {
        self.config_dir.join(LEGACY_CONFIG_FILE)
    }

    /// Per-dashboard YAML files predating storage mode
    pub fn legacy_dashboard_files(&self, dashboard_id: &DashboardId) -> Vec<PathBuf> {
        vec![
            self.config_dir.join(format!("ui-lovelace-{}.yaml", dashboard_id)),
            self.config_dir
                .join(LEGACY_DASHBOARDS_DIR)
                .join(format!("{}.yaml", dashboard_id)),
        ]
    }
}
