//! roster-server: user records over HTTP
//!
//! CRUD endpoints for a single `users` table, a CSV bulk-import path,
//! and the startup provisioning that makes sure the database and table
//! exist before the listener binds.

pub mod config;
pub mod db;
pub mod http;
pub mod ingest;
pub mod models;

pub use config::{ConfigError, DatabaseConfig};
pub use db::{initialize, ProvisionError, RetryPolicy};
pub use http::{run_server, ServerConfig};
