use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub host: HostSettings,
    pub backup: BackupSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HostSettings {
    /// Host's base configuration directory (holds `.storage/`)
    pub config_dir: PathBuf,
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackupSettings {
    /// Relative to `host.config_dir` unless absolute
    pub path: PathBuf,
}

impl AppConfig {
    pub fn backup_dir(&self) -> PathBuf {
        self.host.config_dir.join(&self.backup.path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.host.request_timeout_secs)
    }
}

fn settings_builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("host.config_dir", "/config")?
        .set_default("host.request_timeout_secs", 10)?
        .set_default("backup.path", "dashboard_backups")
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = settings_builder()?
        .add_source(File::with_name("config/dashboard_backup").required(false))
        .add_source(
            Environment::with_prefix("DASHBOARD_BACKUP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
