// Boundary to the home-automation host
use crate::domain::dashboard_id::DashboardId;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Read-only snapshot of the host's in-memory state, taken once per
/// operation and handed to every provider and sink.
#[derive(Debug, Clone, Default)]
pub struct HostState {
    /// Structured lovelace handles by dashboard id, each carrying `config`
    pub lovelace_handles: HashMap<String, Value>,
    /// Runtime entity attributes by dashboard id, each carrying `config`
    pub runtime_states: HashMap<String, Value>,
    /// Dashboard registry objects by dashboard id, each carrying `config`
    pub registry: HashMap<String, Value>,
    /// Browser-side persisted frontend storage
    pub frontend_storage: Option<Value>,
}

#[async_trait]
pub trait HostApi: Send + Sync {
    async fn snapshot(&self) -> anyhow::Result<HostState>;

    /// Request/response round trip over the host's service bus
    async fn request(&self, domain: &str, service: &str, data: Value) -> anyhow::Result<Option<Value>>;

    /// Fire-and-forget service call
    async fn call_service(&self, domain: &str, service: &str, data: Value) -> anyhow::Result<()>;

    /// The dashboard registry's own save method
    async fn save_registry_dashboard(&self, dashboard_id: &str, config: &Value) -> anyhow::Result<()>;

    async fn fire_event(&self, event_type: &str, payload: Value) -> anyhow::Result<()>;

    /// Transient user-facing message
    async fn create_notification(&self, title: &str, message: &str) -> anyhow::Result<()>;
}

/// `request` with a bounded wait; expiry counts as a failure
pub async fn request_bounded(
    host: &dyn HostApi,
    wait: Duration,
    domain: &str,
    service: &str,
    data: Value,
) -> anyhow::Result<Option<Value>> {
    match tokio::time::timeout(wait, host.request(domain, service, data)).await {
        Ok(result) => result,
        Err(_) => anyhow::bail!("{}.{} timed out after {:?}", domain, service, wait),
    }
}

/// `call_service` with a bounded wait; expiry counts as a failure
pub async fn call_bounded(
    host: &dyn HostApi,
    wait: Duration,
    domain: &str,
    service: &str,
    data: Value,
) -> anyhow::Result<()> {
    match tokio::time::timeout(wait, host.call_service(domain, service, data)).await {
        Ok(result) => result,
        Err(_) => anyhow::bail!("{}.{} timed out after {:?}", domain, service, wait),
    }
}

/// How the host addresses a dashboard: the default one has no url path
pub fn url_path(dashboard_id: &DashboardId) -> Value {
    if dashboard_id.is_default() {
        Value::Null
    } else {
        Value::String(dashboard_id.to_string())
    }
}
