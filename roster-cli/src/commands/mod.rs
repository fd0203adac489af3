//! Command implementations for roster CLI

pub mod db;
pub mod provision;
pub mod serve;

pub use provision::run_provision;
pub use serve::run_serve;
