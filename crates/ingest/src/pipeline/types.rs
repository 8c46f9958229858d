use serde::{Deserialize, Serialize};

use pagechunk_core::{DocumentOrigin, DocumentTree};

use crate::chunker::Chunk;
use crate::context::ContextualizedChunk;

/// Output of the CPU-bound stages: conversion, chunking, contextualization.
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    pub tree: DocumentTree,
    pub full_text: String,
    pub chunks: Vec<ContextualizedChunk>,
}

/// One chunk as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    #[serde(flatten)]
    pub chunk: Chunk,
    pub contextualized_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl ChunkRecord {
    pub fn without_embedding(c: ContextualizedChunk) -> Self {
        Self {
            chunk: c.chunk,
            contextualized_text: c.contextualized_text,
            embedding: None,
        }
    }
}

/// Final result for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub origin: DocumentOrigin,
    pub full_text: String,
    pub chunks: Vec<ChunkRecord>,
    pub total_chunks: usize,
    /// Set when embeddings were attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    /// Set when the best-effort policy dropped embeddings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_error: Option<String>,
}

impl ProcessedDocument {
    pub fn has_embeddings(&self) -> bool {
        self.chunks.iter().any(|c| c.embedding.is_some())
    }
}
