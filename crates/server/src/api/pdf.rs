//! `POST /pdf/chunks` and `POST /pdf/process`.
//!
//! Uploads are staged in a temporary `.pdf` file that is removed when the
//! handler returns, on success and on every error path.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use pagechunk_ingest::chunker::Chunk;
use pagechunk_ingest::pipeline::ChunkRecord;
use pagechunk_ingest::DocumentSource;

use super::{ApiError, ErrorResponse};
use crate::state::AppState;

// ── Response types ────────────────────────────────

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ChunkMetaResponse {
    /// Heading trail, root first.
    pub headings: Vec<String>,
    #[schema(value_type = String)]
    pub element: pagechunk_ingest::chunker::ElementKind,
    #[schema(value_type = Option<Object>)]
    pub pages: Option<pagechunk_ingest::chunker::PageSpan>,
    pub doc_items: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[schema(value_type = Object)]
    pub origin: pagechunk_core::DocumentOrigin,
}

impl From<&Chunk> for ChunkMetaResponse {
    fn from(chunk: &Chunk) -> Self {
        Self {
            headings: chunk.headings.iter().map(|h| h.text.clone()).collect(),
            element: chunk.meta.element,
            pages: chunk.meta.pages,
            doc_items: chunk.meta.doc_items.clone(),
            table_id: chunk.meta.table_id.clone(),
            origin: chunk.meta.origin.clone(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ChunkResponse {
    pub text: String,
    pub contextualized_text: String,
    pub index: usize,
    pub meta: ChunkMetaResponse,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ChunksResponse {
    pub chunks: Vec<ChunkResponse>,
    pub total_chunks: usize,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProcessedChunkResponse {
    pub text: String,
    pub contextualized_text: String,
    /// `null` only when embeddings were dropped under the best-effort policy.
    pub embedding: Option<Vec<f32>>,
    pub index: usize,
    pub meta: ChunkMetaResponse,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProcessedDocumentResponse {
    pub chunks: Vec<ProcessedChunkResponse>,
    pub total_chunks: usize,
    pub full_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_error: Option<String>,
}

impl From<ChunkRecord> for ChunkResponse {
    fn from(r: ChunkRecord) -> Self {
        Self {
            meta: ChunkMetaResponse::from(&r.chunk),
            index: r.chunk.index,
            text: r.chunk.text,
            contextualized_text: r.contextualized_text,
        }
    }
}

impl From<ChunkRecord> for ProcessedChunkResponse {
    fn from(r: ChunkRecord) -> Self {
        Self {
            meta: ChunkMetaResponse::from(&r.chunk),
            index: r.chunk.index,
            text: r.chunk.text,
            contextualized_text: r.contextualized_text,
            embedding: r.embedding,
        }
    }
}

// ── Upload staging ────────────────────────────────

struct StagedUpload {
    filename: String,
    size: usize,
    // Deleted on drop.
    file: NamedTempFile,
}

impl StagedUpload {
    fn source(&self) -> DocumentSource {
        DocumentSource::from_staged(self.filename.clone(), self.file.path())
    }
}

fn staging_error(e: std::io::Error) -> ApiError {
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Error processing PDF: {e}"),
    )
}

/// Pull the `file` field, validate its name, and stage its bytes.
async fn stage_upload(
    state: &AppState,
    multipart: &mut Multipart,
    require_embedder: bool,
) -> Result<StagedUpload, ApiError> {
    let field = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::new(e.status(), format!("Invalid multipart request: {e}")))?
            .ok_or_else(|| ApiError::bad_request("No file provided"))?;
        if field.name() == Some("file") || field.file_name().is_some() {
            break field;
        }
    };

    let filename = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(ApiError::only_pdf)?;
    state.pipeline.check_supported(&filename)?;
    if require_embedder && state.pipeline.embedder().is_none() {
        return Err(ApiError::embeddings_unavailable());
    }

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::new(e.status(), format!("Failed to read file: {e}")))?;

    let file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(".pdf")
        .tempfile()
        .map_err(staging_error)?;
    tokio::fs::write(file.path(), &bytes)
        .await
        .map_err(staging_error)?;

    Ok(StagedUpload {
        filename,
        size: bytes.len(),
        file,
    })
}

// ── POST /pdf/chunks ──────────────────────────────

/// Upload a PDF and receive its chunks
///
/// Returns every chunk with its text, contextualized text (heading trail +
/// text), index and metadata. No embeddings are computed.
#[utoipa::path(
    post,
    path = "/pdf/chunks",
    tag = "PDF",
    request_body(content_type = "multipart/form-data", description = "PDF file in field `file`"),
    responses(
        (status = 200, description = "Document chunked", body = ChunksResponse),
        (status = 400, description = "Not a PDF or malformed upload", body = ErrorResponse),
        (status = 500, description = "Error processing PDF", body = ErrorResponse)
    )
)]
pub async fn pdf_chunks(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ChunksResponse>, ApiError> {
    let upload = stage_upload(&state, &mut multipart, false).await?;
    info!(filename = %upload.filename, bytes = upload.size, "chunking upload");

    let doc = state.pipeline.run(upload.source(), false).await?;

    Ok(Json(ChunksResponse {
        total_chunks: doc.total_chunks,
        chunks: doc.chunks.into_iter().map(ChunkResponse::from).collect(),
    }))
}

// ── POST /pdf/process ─────────────────────────────

/// Upload a PDF and receive chunks with embeddings and full text
///
/// All contextualized texts are embedded in one batch; embeddings are
/// attached to every chunk or, on failure, to none.
#[utoipa::path(
    post,
    path = "/pdf/process",
    tag = "PDF",
    request_body(content_type = "multipart/form-data", description = "PDF file in field `file`"),
    responses(
        (status = 200, description = "Document processed", body = ProcessedDocumentResponse),
        (status = 400, description = "Not a PDF or malformed upload", body = ErrorResponse),
        (status = 500, description = "Error processing PDF", body = ErrorResponse),
        (status = 503, description = "No embedding provider configured", body = ErrorResponse)
    )
)]
pub async fn pdf_process(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ProcessedDocumentResponse>, ApiError> {
    let upload = stage_upload(&state, &mut multipart, true).await?;
    info!(filename = %upload.filename, bytes = upload.size, "processing upload");

    let doc = state.pipeline.run(upload.source(), true).await?;

    Ok(Json(ProcessedDocumentResponse {
        total_chunks: doc.total_chunks,
        full_text: doc.full_text,
        embedding_error: doc.embedding_error,
        chunks: doc
            .chunks
            .into_iter()
            .map(ProcessedChunkResponse::from)
            .collect(),
    }))
}
