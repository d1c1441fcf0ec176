// In-memory host and filesystem helpers for unit tests
use crate::application::host::{HostApi, HostState};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Host double: services are unknown (and fail) unless registered
#[derive(Default)]
pub struct InMemoryHost {
    state: HostState,
    snapshot_fails: bool,
    events_fail: bool,
    services: HashSet<String>,
    responses: HashMap<String, Value>,
    hanging: HashSet<String>,
    calls: Mutex<Vec<(String, Value)>>,
    events: Mutex<Vec<(String, Value)>>,
    notifications: Mutex<Vec<(String, String)>>,
    registry_saves: Mutex<Vec<(String, Value)>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, state: HostState) -> Self {
        self.state = state;
        self
    }

    pub fn with_failing_snapshot(mut self) -> Self {
        self.snapshot_fails = true;
        self
    }

    pub fn with_failing_events(mut self) -> Self {
        self.events_fail = true;
        self
    }

    /// Register `domain.service` so calls to it succeed
    pub fn with_service(mut self, key: &str) -> Self {
        self.services.insert(key.to_string());
        self
    }

    pub fn with_response(mut self, key: &str, response: Value) -> Self {
        self.services.insert(key.to_string());
        self.responses.insert(key.to_string(), response);
        self
    }

    /// `domain.service` never answers
    pub fn with_hanging(mut self, key: &str) -> Self {
        self.hanging.insert(key.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, key: &str) -> bool {
        self.calls().iter().any(|(k, _)| k == key)
    }

    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn registry_saves(&self) -> Vec<(String, Value)> {
        self.registry_saves.lock().unwrap().clone()
    }

    async fn dispatch(&self, domain: &str, service: &str, data: Value) -> anyhow::Result<Option<Value>> {
        let key = format!("{}.{}", domain, service);
        self.calls.lock().unwrap().push((key.clone(), data));
        if self.hanging.contains(&key) {
            std::future::pending::<()>().await;
        }
        if !self.services.contains(&key) {
            anyhow::bail!("service {} not found", key);
        }
        Ok(self.responses.get(&key).cloned())
    }
}

#[async_trait]
impl HostApi for InMemoryHost {
    async fn snapshot(&self) -> anyhow::Result<HostState> {
        if self.snapshot_fails {
            anyhow::bail!("host state unavailable");
        }
        Ok(self.state.clone())
    }

    async fn request(&self, domain: &str, service: &str, data: Value) -> anyhow::Result<Option<Value>> {
        self.dispatch(domain, service, data).await
    }

    async fn call_service(&self, domain: &str, service: &str, data: Value) -> anyhow::Result<()> {
        self.dispatch(domain, service, data).await.map(|_| ())
    }

    async fn save_registry_dashboard(&self, dashboard_id: &str, config: &Value) -> anyhow::Result<()> {
        self.registry_saves
            .lock()
            .unwrap()
            .push((dashboard_id.to_string(), config.clone()));
        Ok(())
    }

    async fn fire_event(&self, event_type: &str, payload: Value) -> anyhow::Result<()> {
        if self.events_fail {
            anyhow::bail!("event bus closed");
        }
        self.events.lock().unwrap().push((event_type.to_string(), payload));
        Ok(())
    }

    async fn create_notification(&self, title: &str, message: &str) -> anyhow::Result<()> {
        self.notifications
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
        Ok(())
    }
}

/// Write `contents` to `root/relative`, creating parent directories
pub fn write_file(root: &Path, relative: &str, contents: &[u8]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}
