// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod test_support;

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::application::backup_service::BackupService;
use crate::application::host::HostApi;
use crate::application::resolver::ConfigResolver;
use crate::application::writer::ConfigWriter;
use crate::infrastructure::backup_directory::BackupDirectory;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::detached_host::DetachedHost;
use crate::infrastructure::http_host::HttpHost;
use crate::infrastructure::persisted_store::PersistedStore;
use crate::infrastructure::providers::standard_providers;
use crate::infrastructure::sinks::standard_sinks;
use crate::infrastructure::storage_paths::StoragePaths;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::create_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard_backup=info,tower_http=info".into()),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Host boundary (infrastructure layer)
    let host: Arc<dyn HostApi> = match (&config.host.api_url, &config.host.token) {
        (Some(url), Some(token)) => {
            tracing::info!("Using host API at {}", url);
            Arc::new(HttpHost::new(url.clone(), token.clone(), config.request_timeout())?)
        }
        _ => {
            tracing::warn!("No host API configured; only filesystem sources and sinks are available");
            Arc::new(DetachedHost)
        }
    };

    let store = PersistedStore::new(StoragePaths::new(&config.host.config_dir));
    let backups = BackupDirectory::new(config.backup_dir());
    backups.ensure().await?;

    // Lookup and persistence chains (application layer)
    let resolver = ConfigResolver::new(standard_providers(
        host.clone(),
        store.clone(),
        config.request_timeout(),
    ));
    let writer = ConfigWriter::new(
        standard_sinks(host.clone(), store.clone(), config.request_timeout()),
        store.clone(),
        host.clone(),
    );
    tracing::debug!("Resolver chain: {:?}", resolver.provider_names());
    tracing::debug!("Writer chain: {:?}", writer.sink_names());
    let backup_service = BackupService::new(host, store, backups, resolver, writer);

    let state = Arc::new(AppState { backup_service });

    // Build router (presentation layer)
    let router = create_router(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!(
        "Starting dashboard-backup service on {} (backups in {})",
        addr,
        config.backup_dir().display()
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
