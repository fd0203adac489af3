//! CSV bulk import
//!
//! Uploaded files are parsed into per-row dispositions, the valid rows are
//! inserted through the user store, and the source file is always removed.

pub mod parse;
pub mod pipeline;

pub use parse::{parse_users, RowDisposition};
pub use pipeline::{CsvIngestor, IngestError, IngestReport};
