pub mod batch;
pub mod chunker;
pub mod context;
pub mod document;
pub mod embedding;
pub mod pipeline;
pub mod setup;

pub use batch::{run_batch, BatchOutput, BatchSummary};
pub use context::{ContextStyle, ContextualizedChunk, Contextualizer};
pub use document::{ConversionError, DocumentConverter, DocumentFormat, DocumentSource, StructuredConverter};
pub use pipeline::{EmbeddingPolicy, Pipeline, PipelineError, ProcessedDocument};
