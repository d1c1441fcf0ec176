// HostApi over the host's REST API
use crate::application::host::{HostApi, HostState};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpHost {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct EntityState {
    #[allow(dead_code)]
    entity_id: String,
    #[serde(default)]
    attributes: Value,
}

impl HttpHost {
    pub fn new(base_url: String, token: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build host API client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn service_url(&self, domain: &str, service: &str) -> String {
        format!(
            "{}/api/services/{}/{}",
            self.base_url,
            urlencoding::encode(domain),
            urlencoding::encode(service)
        )
    }

    async fn post(&self, url: &str, body: &Value) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Host request to {} failed with status {}: {}", url, status, body);
        }
        Ok(response)
    }

    /// Dashboard id an entity's attributes refer to, if any
    fn dashboard_key(attributes: &Value) -> Option<String> {
        ["url_path", "dashboard_id"]
            .iter()
            .find_map(|key| attributes.get(*key).and_then(Value::as_str))
            .map(str::to_string)
    }
}

#[async_trait]
impl HostApi for HttpHost {
    /// Only entity state is reachable over REST; handles and registry stay empty
    async fn snapshot(&self) -> Result<HostState> {
        let url = format!("{}/api/states", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("Failed to fetch host states")?
            .error_for_status()
            .context("Host rejected state request")?;
        let states = response
            .json::<Vec<EntityState>>()
            .await
            .context("Failed to parse host states")?;

        let mut snapshot = HostState::default();
        for state in states {
            if state.attributes.get("config").is_none() {
                continue;
            }
            if let Some(key) = Self::dashboard_key(&state.attributes) {
                snapshot.runtime_states.insert(key, state.attributes);
            }
        }
        tracing::debug!("Host snapshot has {} runtime dashboards", snapshot.runtime_states.len());
        Ok(snapshot)
    }

    async fn request(&self, domain: &str, service: &str, data: Value) -> Result<Option<Value>> {
        let url = format!("{}?return_response", self.service_url(domain, service));
        let body = self.post(&url, &data).await?;
        let body = body
            .json::<Value>()
            .await
            .context("Failed to parse service response")?;
        Ok(body.get("service_response").cloned())
    }

    async fn call_service(&self, domain: &str, service: &str, data: Value) -> Result<()> {
        self.post(&self.service_url(domain, service), &data).await?;
        Ok(())
    }

    async fn save_registry_dashboard(&self, _dashboard_id: &str, _config: &Value) -> Result<()> {
        anyhow::bail!("dashboard registry is not reachable over the REST API")
    }

    async fn fire_event(&self, event_type: &str, payload: Value) -> Result<()> {
        let url = format!("{}/api/events/{}", self.base_url, urlencoding::encode(event_type));
        self.post(&url, &payload).await?;
        Ok(())
    }

    async fn create_notification(&self, title: &str, message: &str) -> Result<()> {
        self.call_service(
            "persistent_notification",
            "create",
            json!({ "title": title, "message": message }),
        )
        .await
    }
}
