//! Chunker configuration and output types.

use serde::{Deserialize, Serialize};

use pagechunk_core::DocumentOrigin;

// ── Configuration ───────────────────────────────────────────────────────────

/// Configuration for the hierarchical chunker.
#[derive(Debug, Clone, Default)]
pub struct ChunkerConfig {
    /// Emit a whole list as one chunk instead of one chunk per item (default: false).
    pub merge_list_items: bool,
}

// ── Chunk output ────────────────────────────────────────────────────────────

/// One entry of a heading trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingRef {
    pub text: String,
    pub level: u8,
}

impl HeadingRef {
    pub fn new(text: impl Into<String>, level: u8) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}

/// Structural element a chunk was cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Paragraph,
    ListItem,
    /// A merged list (see [`ChunkerConfig::merge_list_items`]).
    List,
    Table,
}

/// Inclusive page range covered by a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpan {
    pub first: u32,
    pub last: u32,
}

impl PageSpan {
    pub fn single(page: u32) -> Self {
        Self {
            first: page,
            last: page,
        }
    }

    pub fn include(self, page: u32) -> Self {
        Self {
            first: self.first.min(page),
            last: self.last.max(page),
        }
    }
}

/// Attribution metadata carried by every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMeta {
    pub element: ElementKind,
    pub pages: Option<PageSpan>,
    /// Refs (`#/nodes/<id>`) of the tree nodes the chunk was built from.
    pub doc_items: Vec<String>,
    pub table_id: Option<String>,
    pub origin: DocumentOrigin,
}

/// A leaf-level unit of a document with its heading context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// 0-based position in document order.
    pub index: usize,
    /// Whitespace-normalized text; never empty.
    pub text: String,
    /// Ancestor headings, root first.
    pub headings: Vec<HeadingRef>,
    pub meta: ChunkMeta,
}

impl Chunk {
    pub fn heading_texts(&self) -> Vec<&str> {
        self.headings.iter().map(|h| h.text.as_str()).collect()
    }
}
