pub mod ollama;
pub mod openai;
pub mod traits;

pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;
pub use traits::{Embedder, EmbeddingError};
