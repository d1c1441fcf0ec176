// Infrastructure layer - Filesystem, host API and configuration adapters
pub mod backup_directory;
pub mod config;
pub mod detached_host;
pub mod http_host;
pub mod persisted_store;
pub mod providers;
pub mod sinks;
pub mod storage_paths;
