// Resolver - Locate a dashboard's current configuration
use crate::application::config_chain::ConfigProvider;
use crate::application::host::HostState;
use crate::domain::dashboard_config::DashboardConfig;
use crate::domain::dashboard_id::DashboardId;
use crate::domain::error::BackupError;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Resolved {
    pub provider: &'static str,
    pub config: DashboardConfig,
}

#[derive(Clone)]
pub struct ConfigResolver {
    providers: Vec<Arc<dyn ConfigProvider>>,
}

impl ConfigResolver {
    /// Providers are tried in the order given, highest priority first
    pub fn new(providers: Vec<Arc<dyn ConfigProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Return the first non-empty configuration any provider yields
    pub async fn resolve(
        &self,
        dashboard_id: &DashboardId,
        state: &HostState,
    ) -> Result<Resolved, BackupError> {
        for provider in &self.providers {
            match provider.fetch(dashboard_id, state).await {
                Ok(Some(config)) if !config.is_empty() => {
                    tracing::debug!(
                        "Resolved dashboard {} from provider {}",
                        dashboard_id,
                        provider.name()
                    );
                    return Ok(Resolved {
                        provider: provider.name(),
                        config,
                    });
                }
                Ok(_) => {
                    tracing::debug!("Provider {} has no config for {}", provider.name(), dashboard_id);
                }
                Err(e) => {
                    tracing::debug!(
                        "Provider {} failed for {}: {:#}",
                        provider.name(),
                        dashboard_id,
                        e
                    );
                }
            }
        }

        tracing::error!("No provider yielded a configuration for {}", dashboard_id);
        Err(BackupError::DashboardNotFound(dashboard_id.to_string()))
    }
}
