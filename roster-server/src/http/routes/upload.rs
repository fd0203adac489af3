//! CSV upload endpoint
//!
//! The multipart `file` field is streamed into a temporary file in the
//! upload directory and handed to the ingestion pipeline, which removes it.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Largest accepted upload body
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Multipart field carrying the CSV file
const FILE_FIELD: &str = "file";

/// Upload response
#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    /// Rows that passed validation and were submitted for insert
    pub attempted: usize,
}

/// POST /users/upload - import users from a CSV file
async fn upload_users(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let staged = stage_upload(&state.upload_dir, &mut multipart).await?;
    let report = state.ingestor.ingest_temp(staged).await?;

    Ok(Json(UploadResponse {
        message: format!("Inserted {} users successfully.", report.attempted),
        attempted: report.attempted,
    }))
}

/// Write the `file` field to a temp file; other fields are skipped.
///
/// The returned guard deletes the file when dropped, so a failed write
/// leaves nothing behind.
async fn stage_upload(dir: &Path, multipart: &mut Multipart) -> Result<TempPath, ApiError> {
    while let Some(mut field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let (file, path) = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".csv")
            .tempfile_in(dir)
            .map_err(io_error)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);

        while let Some(chunk) = field.chunk().await.map_err(upload_error)? {
            file.write_all(&chunk).await.map_err(io_error)?;
        }
        file.flush().await.map_err(io_error)?;

        tracing::debug!(path = %path.display(), file_name = ?field.file_name(), "Upload staged");
        return Ok(path);
    }

    Err(ApiError::Upload {
        reason: format!("missing '{}' field", FILE_FIELD),
    })
}

fn upload_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::Upload {
        reason: e.body_text(),
    }
}

fn io_error(e: std::io::Error) -> ApiError {
    ApiError::Internal {
        message: format!("failed to stage upload: {}", e),
    }
}

/// Upload routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/upload", post(upload_users))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
