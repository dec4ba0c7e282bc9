use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use finlens_import::ImportError;
use serde_json::json;

/// A client-facing failure rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub detail: String,
}

impl AppError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

// Every import failure is the client's file, whatever its kind.
impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        AppError::bad_request(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
