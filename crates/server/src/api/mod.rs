//! API endpoint modules and the shared error type.

pub mod doc;
mod health;
mod pdf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use pagechunk_ingest::PipelineError;

pub use health::health;
pub use pdf::{pdf_chunks, pdf_process};

// ── Error type ───────────────────────────────────────────────────

/// Error body: `{"detail": "..."}`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn only_pdf() -> Self {
        Self::bad_request("Only PDF files are supported")
    }

    pub fn embeddings_unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Embedding provider not configured",
        )
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::UnsupportedInput(_) => Self::only_pdf(),
            PipelineError::EmbedderUnavailable => Self::embeddings_unavailable(),
            other => {
                tracing::error!(error = %other, "PDF processing failed");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error processing PDF: {other}"),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { detail: self.detail })).into_response()
    }
}
