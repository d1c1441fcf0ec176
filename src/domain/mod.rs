// Domain layer - Dashboards, backups and the notifications they produce
pub mod backup;
pub mod dashboard_config;
pub mod dashboard_id;
pub mod error;
pub mod events;
