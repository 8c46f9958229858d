use thiserror::Error;

use crate::document::ConversionError;
use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("Embedding batch mismatch: expected {expected} vectors, got {actual}")]
    EmbeddingBatchMismatch { expected: usize, actual: usize },

    #[error("Embedding request failed: {0}")]
    EmbeddingTransport(#[from] EmbeddingError),

    #[error("Inconsistent embedding dimensions at chunk {index}: expected {expected}, got {actual}")]
    InconsistentDimensions {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Embeddings requested but no embedder is configured")]
    EmbedderUnavailable,

    #[error("Background task failed: {0}")]
    Task(String),
}
