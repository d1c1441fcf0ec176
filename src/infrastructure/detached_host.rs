// HostApi used when no host API is configured
use crate::application::host::{HostApi, HostState};
use async_trait::async_trait;
use serde_json::Value;

/// Only the filesystem is available: host calls fail, notifications are logged
#[derive(Debug, Clone, Default)]
pub struct DetachedHost;

#[async_trait]
impl HostApi for DetachedHost {
    async fn snapshot(&self) -> anyhow::Result<HostState> {
        Ok(HostState::default())
    }

    async fn request(&self, domain: &str, service: &str, _data: Value) -> anyhow::Result<Option<Value>> {
        anyhow::bail!("host API not configured; cannot call {}.{}", domain, service)
    }

    async fn call_service(&self, domain: &str, service: &str, _data: Value) -> anyhow::Result<()> {
        anyhow::bail!("host API not configured; cannot call {}.{}", domain, service)
    }

    async fn save_registry_dashboard(&self, _dashboard_id: &str, _config: &Value) -> anyhow::Result<()> {
        anyhow::bail!("host API not configured")
    }

    async fn fire_event(&self, event_type: &str, payload: Value) -> anyhow::Result<()> {
        tracing::info!("Event {}: {}", event_type, payload);
        Ok(())
    }

    async fn create_notification(&self, title: &str, message: &str) -> anyhow::Result<()> {
        tracing::info!("{}: {}", title, message);
        Ok(())
    }
}
