// Presentation layer - HTTP surface for the backup commands
pub mod app_state;
pub mod error_response;
pub mod handlers;
pub mod routes;
