//! OpenAPI documentation aggregator, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "pagechunk API",
        version = "0.1.0",
        description = "PDF ingestion: structure-aware chunks with heading context and optional embeddings.",
    ),
    tags(
        (name = "Health", description = "Service readiness and embedding availability"),
        (name = "PDF", description = "Upload a PDF and receive chunks or chunks with embeddings"),
    ),
    paths(
        crate::api::health::health,
        crate::api::pdf::pdf_chunks,
        crate::api::pdf::pdf_process,
    ),
    components(schemas(
        crate::api::ErrorResponse,
        crate::api::health::HealthResponse,
        crate::api::pdf::ChunkMetaResponse,
        crate::api::pdf::ChunkResponse,
        crate::api::pdf::ChunksResponse,
        crate::api::pdf::ProcessedChunkResponse,
        crate::api::pdf::ProcessedDocumentResponse,
    ))
)]
pub struct ApiDoc;
