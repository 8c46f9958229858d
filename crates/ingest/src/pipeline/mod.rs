//! Pipeline orchestrator: convert → chunk → contextualize → (embed).
//!
//! Collaborators are constructed by the caller and injected through
//! [`PipelineBuilder`]. A [`Pipeline`] is cheap to clone and can be shared
//! across concurrent requests.

mod error;
mod types;


use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::chunker::HierarchicalChunker;
use crate::context::{ContextualizedChunk, Contextualizer};
use crate::document::{DocumentConverter, DocumentFormat, DocumentSource, StructuredConverter};
use crate::embedding::Embedder;

pub use error::PipelineError;
pub use types::{ChunkRecord, PreparedDocument, ProcessedDocument};

/// What happens when the embedding call itself fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmbeddingPolicy {
    /// Transport failures abort the document.
    #[default]
    Required,
    /// Transport failures return the document without any embeddings.
    BestEffort,
}

impl FromStr for EmbeddingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "required" => Ok(Self::Required),
            "best_effort" => Ok(Self::BestEffort),
            other => Err(format!(
                "unknown embedding policy '{other}' (expected required|best_effort)"
            )),
        }
    }
}

impl fmt::Display for EmbeddingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("required"),
            Self::BestEffort => f.write_str("best_effort"),
        }
    }
}

#[derive(Clone)]
pub struct Pipeline {
    converter: Arc<dyn DocumentConverter>,
    chunker: HierarchicalChunker,
    contextualizer: Contextualizer,
    embedder: Option<Arc<dyn Embedder>>,
    accepted: Vec<DocumentFormat>,
    policy: EmbeddingPolicy,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("chunker", &self.chunker)
            .field("contextualizer", &self.contextualizer)
            .field("embedding_model", &self.embedding_model())
            .field("accepted", &self.accepted)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn embedder(&self) -> Option<&Arc<dyn Embedder>> {
        self.embedder.as_ref()
    }

    pub fn embedding_model(&self) -> Option<&str> {
        self.embedder.as_deref().map(|e| e.model())
    }

    pub fn policy(&self) -> EmbeddingPolicy {
        self.policy
    }

    /// Reject inputs this pipeline will not convert. Runs before any I/O.
    pub fn check_supported(&self, filename: &str) -> Result<DocumentFormat, PipelineError> {
        DocumentFormat::from_filename(filename)
            .filter(|format| self.accepted.contains(format) && self.converter.supports(*format))
            .ok_or_else(|| PipelineError::UnsupportedInput(filename.to_string()))
    }

    /// Run the CPU-bound stages synchronously.
    pub fn prepare(&self, source: &DocumentSource) -> Result<PreparedDocument, PipelineError> {
        self.check_supported(source.filename())?;

        let tree = self.converter.convert(source)?;
        let full_text = tree.export_text();
        let chunks = self.chunker.chunk(&tree);
        let chunks = self.contextualizer.contextualize_all(chunks);

        info!(
            filename = source.filename(),
            nodes = tree.len(),
            chunks = chunks.len(),
            "document prepared"
        );
        Ok(PreparedDocument {
            tree,
            full_text,
            chunks,
        })
    }

    /// Process one document, attaching embeddings when `embed` is set.
    pub async fn run(
        &self,
        source: DocumentSource,
        embed: bool,
    ) -> Result<ProcessedDocument, PipelineError> {
        self.check_supported(source.filename())?;
        let embedder = match (embed, &self.embedder) {
            (false, _) => None,
            (true, Some(e)) => Some(Arc::clone(e)),
            (true, None) => return Err(PipelineError::EmbedderUnavailable),
        };

        info!(filename = source.filename(), embed, "processing document");

        let this = self.clone();
        let prepared = tokio::task::spawn_blocking(move || this.prepare(&source))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))??;

        let PreparedDocument {
            tree, full_text, chunks,
        } = prepared;

        let mut embedding_model = None;
        let mut embedding_error = None;
        let records = match embedder {
            None => chunks.into_iter().map(ChunkRecord::without_embedding).collect(),
            Some(_) if chunks.is_empty() => Vec::new(),
            Some(embedder) => match self.embed(embedder.as_ref(), &chunks).await {
                Ok(vectors) => {
                    embedding_model = Some(embedder.model().to_string());
                    attach_embeddings(chunks, vectors)?
                }
                Err(PipelineError::EmbeddingTransport(e))
                    if self.policy == EmbeddingPolicy::BestEffort && e.is_transient() =>
                {
                    warn!(
                        filename = %tree.origin.filename,
                        error = %e,
                        "embedding failed, returning chunks without embeddings"
                    );
                    embedding_error = Some(e.to_string());
                    chunks.into_iter().map(ChunkRecord::without_embedding).collect()
                }
                Err(e) => {
                    error!(filename = %tree.origin.filename, error = %e, "embedding failed");
                    return Err(e);
                }
            },
        };

        Ok(ProcessedDocument {
            origin: tree.origin,
            full_text,
            total_chunks: records.len(),
            chunks: records,
            embedding_model,
            embedding_error,
        })
    }

    /// Submit every contextualized text as one ordered batch.
    async fn embed(
        &self,
        embedder: &dyn Embedder,
        chunks: &[ContextualizedChunk],
    ) -> Result<Vec<Vec<f32>>, PipelineError> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.contextualized_text.as_str()).collect();
        let start = Instant::now();
        let vectors = embedder.embed_batch(&texts).await?;
        info!(
            model = embedder.model(),
            batch = texts.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "embedding batch complete"
        );
        Ok(vectors)
    }
}

/// Zip vectors onto chunks by position. All-or-nothing: any count or
/// dimension inconsistency returns an error and attaches nothing.
pub fn attach_embeddings(
    chunks: Vec<ContextualizedChunk>,
    vectors: Vec<Vec<f32>>,
) -> Result<Vec<ChunkRecord>, PipelineError> {
    if vectors.len() != chunks.len() {
        return Err(PipelineError::EmbeddingBatchMismatch {
            expected: chunks.len(),
            actual: vectors.len(),
        });
    }
    if let Some(first) = vectors.first() {
        let expected = first.len();
        if let Some((index, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != expected) {
            return Err(PipelineError::InconsistentDimensions {
                index,
                expected,
                actual: v.len(),
            });
        }
    }

    Ok(chunks
        .into_iter()
        .zip(vectors)
        .map(|(c, v)| ChunkRecord {
            chunk: c.chunk,
            contextualized_text: c.contextualized_text,
            embedding: Some(v),
        })
        .collect())
}

/// Builder for [`Pipeline`]. Unset collaborators fall back to the bundled
/// defaults; the embedder stays unset unless provided.
#[derive(Default)]
pub struct PipelineBuilder {
    converter: Option<Arc<dyn DocumentConverter>>,
    chunker: Option<HierarchicalChunker>,
    contextualizer: Option<Contextualizer>,
    embedder: Option<Arc<dyn Embedder>>,
    accepted: Option<Vec<DocumentFormat>>,
    policy: EmbeddingPolicy,
}

impl PipelineBuilder {
    pub fn converter(mut self, converter: Arc<dyn DocumentConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn chunker(mut self, chunker: HierarchicalChunker) -> Self {
        self.chunker = Some(chunker);
        self
    }

    pub fn contextualizer(mut self, contextualizer: Contextualizer) -> Self {
        self.contextualizer = Some(contextualizer);
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn maybe_embedder(mut self, embedder: Option<Arc<dyn Embedder>>) -> Self {
        self.embedder = embedder;
        self
    }

    /// Restrict accepted input formats (default: PDF only).
    pub fn accept(mut self, formats: impl IntoIterator<Item = DocumentFormat>) -> Self {
        self.accepted = Some(formats.into_iter().collect());
        self
    }

    pub fn embedding_policy(mut self, policy: EmbeddingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            converter: self
                .converter
                .unwrap_or_else(|| Arc::new(StructuredConverter::new())),
            chunker: self.chunker.unwrap_or_default(),
            contextualizer: self.contextualizer.unwrap_or_default(),
            embedder: self.embedder,
            accepted: self.accepted.unwrap_or_else(|| vec![DocumentFormat::Pdf]),
            policy: self.policy,
        }
    }
}
