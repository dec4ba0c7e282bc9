use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use finlens_core::{analyze, AnalysisResult};
use finlens_import::StatementPipeline;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::AppState;

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// POST /analyze - Normalize an uploaded statement and summarize it
///
/// Expects a multipart form with a `file` field carrying a filename; the
/// filename's extension selects the parser.
pub async fn analyze_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Failed to read form field: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("Failed to read file data: {e}")))?;
        upload = Some((filename, bytes.to_vec()));
    }

    let (filename, bytes) = upload.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    tracing::info!(filename = %filename, bytes = bytes.len(), "analyzing upload");

    let vocabulary = Arc::clone(&state.vocabulary);
    let result = tokio::task::spawn_blocking(move || {
        StatementPipeline::new(&vocabulary)
            .clean(&bytes, &filename)
            .map(analyze)
    })
    .await
    .map_err(|e| AppError::internal(format!("Analysis task failed: {e}")))??;

    Ok(Json(result))
}
