//! Depth-first chunking with an explicit heading trail.

use pagechunk_core::{DocumentTree, NodeId, NodeKind};

use super::helpers::{node_text, normalize_whitespace};
use super::types::{Chunk, ChunkMeta, ChunkerConfig, ElementKind, HeadingRef, PageSpan};

/// Stack of headings active at the current traversal position.
#[derive(Debug, Clone, Default)]
pub struct HeadingTrail {
    stack: Vec<HeadingRef>,
}

impl HeadingTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a heading: drop siblings and deeper headings, then push.
    pub fn enter(&mut self, heading: HeadingRef) {
        while self
            .stack
            .last()
            .is_some_and(|top| top.level >= heading.level)
        {
            self.stack.pop();
        }
        self.stack.push(heading);
    }

    pub fn as_slice(&self) -> &[HeadingRef] {
        &self.stack
    }

    pub fn snapshot(&self) -> Vec<HeadingRef> {
        self.stack.clone()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

/// Whether the walk continues into a node's children.
enum Visit {
    Descend,
    Skip,
}

/// Partitions a document tree into ordered, heading-aware chunks.
#[derive(Debug, Clone, Default)]
pub struct HierarchicalChunker {
    config: ChunkerConfig,
}

impl HierarchicalChunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Chunk the whole tree. Total over valid trees: an empty tree yields no chunks.
    pub fn chunk(&self, tree: &DocumentTree) -> Vec<Chunk> {
        let mut trail = HeadingTrail::new();
        let mut chunks = Vec::new();
        let mut stack = vec![tree.root()];

        while let Some(id) = stack.pop() {
            if let Visit::Descend = self.visit(tree, id, &mut trail, &mut chunks) {
                stack.extend(tree.children(id).iter().rev().copied());
            }
        }

        tracing::debug!(
            filename = %tree.origin.filename,
            chunks = chunks.len(),
            "chunked document"
        );
        chunks
    }

    /// Handle one node at the current position of the walk.
    fn visit(
        &self,
        tree: &DocumentTree,
        id: NodeId,
        trail: &mut HeadingTrail,
        out: &mut Vec<Chunk>,
    ) -> Visit {
        let node = tree.node(id);
        match node.kind {
            NodeKind::Heading { level } => {
                if let Some(text) = node_text(node) {
                    trail.enter(HeadingRef { text, level });
                }
            }
            NodeKind::Paragraph | NodeKind::ListItem | NodeKind::Table => {
                if let Some(text) = node_text(node) {
                    let element = match node.kind {
                        NodeKind::Table => ElementKind::Table,
                        NodeKind::ListItem => ElementKind::ListItem,
                        _ => ElementKind::Paragraph,
                    };
                    let chunk = Chunk {
                        index: out.len(),
                        text,
                        headings: trail.snapshot(),
                        meta: ChunkMeta {
                            element,
                            pages: node.page.map(PageSpan::single),
                            doc_items: vec![id.to_string()],
                            table_id: node.label.clone(),
                            origin: tree.origin.clone(),
                        },
                    };
                    out.push(chunk);
                }
            }
            NodeKind::List if self.config.merge_list_items => {
                if let Some(chunk) = merged_list(tree, id, trail, out.len()) {
                    out.push(chunk);
                }
                return Visit::Skip;
            }
            NodeKind::Root | NodeKind::Page | NodeKind::Section | NodeKind::List => {}
        }
        Visit::Descend
    }
}

fn merged_list(
    tree: &DocumentTree,
    list: NodeId,
    trail: &HeadingTrail,
    index: usize,
) -> Option<Chunk> {
    let mut lines = Vec::new();
    let mut doc_items = Vec::new();
    let mut pages: Option<PageSpan> = None;

    for &item in tree.children(list) {
        let node = tree.node(item);
        let Some(text) = node.text.as_deref().map(normalize_whitespace) else {
            continue;
        };
        if text.is_empty() {
            continue;
        }
        lines.push(text);
        doc_items.push(item.to_string());
        if let Some(page) = node.page {
            pages = Some(pages.map_or(PageSpan::single(page), |span| span.include(page)));
        }
    }

    if lines.is_empty() {
        return None;
    }
    Some(Chunk {
        index,
        text: lines.join("\n"),
        headings: trail.snapshot(),
        meta: ChunkMeta {
            element: ElementKind::List,
            pages: pages.or_else(|| tree.node(list).page.map(PageSpan::single)),
            doc_items,
            table_id: None,
            origin: tree.origin.clone(),
        },
    })
}
