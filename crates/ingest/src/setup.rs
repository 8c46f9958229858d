//! Build a [`Pipeline`] from [`Config`].

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use pagechunk_core::Config;

use crate::chunker::{ChunkerConfig, HierarchicalChunker};
use crate::context::{ContextStyle, Contextualizer};
use crate::embedding::{Embedder, OllamaEmbedder, OpenAiEmbedder};
use crate::pipeline::{EmbeddingPolicy, Pipeline};

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Unknown embedding provider '{0}' (expected openai|ollama|none)")]
    UnknownProvider(String),
    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Construct the configured embedder, if any.
///
/// The OpenAI provider without an API key yields `None`: chunking keeps
/// working and embedding requests fail with `EmbedderUnavailable`.
pub fn build_embedder(config: &Config) -> Result<Option<Arc<dyn Embedder>>, SetupError> {
    let emb = &config.embedding;
    let dims = emb.dimensions as usize;

    match emb.provider.trim().to_ascii_lowercase().as_str() {
        "openai" => match &config.openai.api_key {
            Some(key) => {
                info!(model = %emb.model, dims, "using OpenAI embeddings");
                let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::new(
                    key.clone(),
                    emb.model.clone(),
                    config.openai.base_url.clone(),
                    dims,
                ));
                Ok(Some(embedder))
            }
            None => {
                warn!("OPENAI_API_KEY not set, embeddings disabled");
                Ok(None)
            }
        },
        "ollama" => {
            info!(url = %config.ollama.url, model = %emb.model, dims, "using Ollama embeddings");
            let embedder: Arc<dyn Embedder> = Arc::new(OllamaEmbedder::new(
                config.ollama.url.clone(),
                emb.model.clone(),
                dims,
            ));
            Ok(Some(embedder))
        }
        "none" | "" => Ok(None),
        other => Err(SetupError::UnknownProvider(other.to_string())),
    }
}

/// Assemble the full pipeline: PDF input, configured chunking and embeddings.
pub fn build_pipeline(config: &Config) -> Result<Pipeline, SetupError> {
    let style: ContextStyle = config
        .chunking
        .context_style
        .parse()
        .map_err(|reason| SetupError::Invalid {
            key: "CONTEXT_STYLE",
            reason,
        })?;
    let policy: EmbeddingPolicy =
        config
            .embedding
            .policy
            .parse()
            .map_err(|reason| SetupError::Invalid {
                key: "EMBEDDING_POLICY",
                reason,
            })?;

    Ok(Pipeline::builder()
        .chunker(HierarchicalChunker::new(ChunkerConfig {
            merge_list_items: config.chunking.merge_list_items,
        }))
        .contextualizer(Contextualizer::new(style))
        .maybe_embedder(build_embedder(config)?)
        .embedding_policy(policy)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut cfg = Config::for_profile("SETUPTEST_UNSET_PROFILE");
        cfg.embedding.provider = "openai".into();
        cfg.embedding.model = "text-embedding-3-small".into();
        cfg.embedding.dimensions = 1536;
        cfg.embedding.policy = "required".into();
        cfg.openai.api_key = None;
        cfg.chunking.context_style = "plain".into();
        cfg
    }

    #[test]
    fn openai_without_key_disables_embeddings() {
        assert!(build_embedder(&config()).unwrap().is_none());
    }

    #[test]
    fn openai_with_key_reports_model() {
        let mut cfg = config();
        cfg.openai.api_key = Some("sk-test".into());
        let embedder = build_embedder(&cfg).unwrap().unwrap();
        assert_eq!(embedder.model(), "text-embedding-3-small");
        assert_eq!(embedder.dimensions(), 1536);
    }

    #[test]
    fn ollama_and_none_providers() {
        let mut cfg = config();
        cfg.embedding.provider = "ollama".into();
        cfg.embedding.model = "nomic-embed-text".into();
        cfg.embedding.dimensions = 768;
        assert_eq!(build_embedder(&cfg).unwrap().unwrap().model(), "nomic-embed-text");

        cfg.embedding.provider = "none".into();
        assert!(build_embedder(&cfg).unwrap().is_none());
    }

    #[test]
    fn bad_settings_are_errors() {
        let mut cfg = config();
        cfg.embedding.provider = "cohere".into();
        assert!(matches!(build_embedder(&cfg), Err(SetupError::UnknownProvider(_))));

        let mut cfg = config();
        cfg.chunking.context_style = "fancy".into();
        assert!(matches!(
            build_pipeline(&cfg),
            Err(SetupError::Invalid { key: "CONTEXT_STYLE", .. })
        ));
    }

    #[test]
    fn pipeline_accepts_pdf_only() {
        let p = build_pipeline(&config()).unwrap();
        assert!(p.check_supported("a.pdf").is_ok());
        assert!(p.check_supported("a.md").is_err());
        assert!(p.embedding_model().is_none());
    }
}
