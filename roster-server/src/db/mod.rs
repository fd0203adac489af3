//! Database layer - provisioning, connection pool and the user store
//!
//! # Design Principles
//!
//! - Provisioning runs once, on its own connections, before serving
//! - Connection pool (max 5 connections) shared through an owned handle
//! - Rely on DB constraints, handle conflicts - no check-then-insert

pub mod pool;
pub mod provision;
pub mod repos;
pub mod schema;

pub use pool::create_pool;
pub use provision::{connect_with_retry, retry_with_backoff, Connected, ProvisionError, RetryPolicy};
pub use repos::*;
pub use schema::{initialize, initialize_schema, SchemaReport};
