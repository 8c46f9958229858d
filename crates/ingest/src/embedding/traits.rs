use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl EmbeddingError {
    /// Network, auth or quota failures from the provider. A dimension
    /// mismatch means the model and config disagree and is never transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Api(_))
    }
}

/// Trait for embedding backends (OpenAI, Ollama, ...).
///
/// Implementations are shared across concurrent requests behind an `Arc`.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input text (in order).
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// The dimensionality of the output vectors.
    fn dimensions(&self) -> usize;

    /// Model identifier sent with every batch.
    fn model(&self) -> &str;
}
