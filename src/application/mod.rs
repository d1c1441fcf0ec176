// Application layer - Lookup/persistence chains and the backup use cases
pub mod backup_service;
pub mod best_effort;
pub mod config_chain;
pub mod dashboard_locks;
pub mod host;
pub mod resolver;
pub mod writer;
