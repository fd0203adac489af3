//! Domain models with validation at construction
//!
//! Invalid input returns ValidationError, not panic.

pub mod database_name;
pub mod user;
pub mod validation;

pub use database_name::DatabaseName;
pub use user::{NewUser, User};
pub use validation::ValidationError;
