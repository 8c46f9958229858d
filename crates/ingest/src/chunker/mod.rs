//! Hierarchical chunking engine.
//!
//! Walks a [`DocumentTree`](pagechunk_core::DocumentTree) in reading order and
//! emits one chunk per paragraph, table or list item, each stamped with the
//! heading trail active at its position.

mod helpers;
mod hierarchical;
mod types;

pub use hierarchical::{HeadingTrail, HierarchicalChunker};
pub use types::{Chunk, ChunkMeta, ChunkerConfig, ElementKind, HeadingRef, PageSpan};
