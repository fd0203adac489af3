//! User record stores
//!
//! `PgUserStore` is the production store; `MemoryUserStore` keeps the same
//! contract in process so handlers and the ingestion pipeline can be
//! exercised without a database.

pub mod memory;
pub mod users;

pub use memory::MemoryUserStore;
pub use users::{DbError, InsertOutcome, PgUserStore, UserStore};
