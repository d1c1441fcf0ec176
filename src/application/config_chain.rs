// Capabilities tried in order by the resolver and writer chains
use crate::application::host::HostState;
use crate::domain::dashboard_config::DashboardConfig;
use crate::domain::dashboard_id::DashboardId;
use async_trait::async_trait;

/// One source of a dashboard's current configuration
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` means "nothing here"; errors are treated the same way by the chain
    async fn fetch(
        &self,
        dashboard_id: &DashboardId,
        state: &HostState,
    ) -> anyhow::Result<Option<DashboardConfig>>;
}

/// One way of persisting a configuration so the host picks it up
#[async_trait]
pub trait ConfigSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn store(
        &self,
        dashboard_id: &DashboardId,
        config: &DashboardConfig,
        state: &HostState,
    ) -> anyhow::Result<()>;
}
