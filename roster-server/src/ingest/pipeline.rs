//! Ingestion pipeline: parse, validate, batch insert, clean up

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempPath;
use tracing::{debug, info, warn};

use super::parse::{parse_users, RowDisposition};
use crate::db::repos::{DbError, InsertOutcome, UserStore};

/// Ingestion errors
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV parser task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("failed to insert users: {0}")]
    Store(#[from] DbError),
}

/// Outcome of one import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestReport {
    /// Rows that passed validation and were submitted for insert
    pub attempted: usize,
    pub inserted: usize,
    /// Submitted rows skipped because their email already existed
    pub duplicates: usize,
    /// Rows rejected by validation
    pub dropped: usize,
}

/// Imports CSV files of users into a [`UserStore`]
#[derive(Clone)]
pub struct CsvIngestor {
    store: Arc<dyn UserStore>,
}

impl CsvIngestor {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Import the file at `path`, taking ownership of it.
    ///
    /// The file is deleted afterwards whether or not the import succeeds.
    pub async fn ingest(&self, path: impl Into<PathBuf>) -> Result<IngestReport, IngestError> {
        let path = path.into();
        let source = match TempPath::try_from_path(&path) {
            Ok(source) => source,
            Err(e) => {
                // No guard could be built; remove the file directly
                if let Err(remove_err) = std::fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %remove_err, "Failed to remove uploaded file");
                }
                return Err(IngestError::Io(e));
            }
        };
        self.ingest_temp(source).await
    }

    /// Import an already-guarded temporary file. The file is removed before
    /// the result is returned.
    pub async fn ingest_temp(&self, source: TempPath) -> Result<IngestReport, IngestError> {
        let result = self.load(&source).await;

        let path = source.to_path_buf();
        if let Err(e) = source.close() {
            warn!(path = %path.display(), error = %e, "Failed to remove uploaded file");
        }

        match &result {
            Ok(report) => info!(
                path = %path.display(),
                attempted = report.attempted,
                inserted = report.inserted,
                duplicates = report.duplicates,
                dropped = report.dropped,
                "CSV import finished"
            ),
            Err(e) => warn!(path = %path.display(), error = %e, "CSV import failed"),
        }
        result
    }

    async fn load(&self, path: &Path) -> Result<IngestReport, IngestError> {
        let file = File::open(path)?;
        let rows = tokio::task::spawn_blocking(move || parse_users(BufReader::new(file))).await??;

        let mut accepted = Vec::with_capacity(rows.len());
        let mut dropped = 0;
        for row in rows {
            match row {
                RowDisposition::Accepted(user) => accepted.push(user),
                other => {
                    dropped += 1;
                    debug!(row = ?other, "Dropping CSV row");
                }
            }
        }

        let outcomes = self.store.insert_batch(&accepted).await?;
        let inserted = outcomes
            .iter()
            .filter(|o| **o == InsertOutcome::Inserted)
            .count();

        Ok(IngestReport {
            attempted: accepted.len(),
            inserted,
            duplicates: outcomes.len() - inserted,
            dropped,
        })
    }
}
