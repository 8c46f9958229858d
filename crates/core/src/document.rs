//! Arena-backed document tree produced by the conversion engines.
//!
//! Every node lives in a single `Vec` owned by [`DocumentTree`]; parent and
//! child links are plain [`NodeId`] indices into that arena. Node 0 is always
//! the root container.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CoreError;

/// Index of a node inside its [`DocumentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#/nodes/{}", self.0)
    }
}

/// Structural role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    /// One physical page of a paginated source.
    Page,
    Section,
    /// Heading with level 1 (outermost) to 6.
    Heading { level: u8 },
    Paragraph,
    List,
    ListItem,
    Table,
}

impl NodeKind {
    /// Layout containers hold children but never carry text of their own.
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Root | NodeKind::Page | NodeKind::Section | NodeKind::List)
    }

    pub fn heading_level(&self) -> Option<u8> {
        match self {
            NodeKind::Heading { level } => Some(*level),
            _ => None,
        }
    }
}

/// A node in the document arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Raw text for text-bearing nodes. Tables store their rendered grid here.
    pub text: Option<String>,
    /// Cell grid, only populated for tables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<Vec<String>>,
    /// 1-based page number, when the source is paginated.
    pub page: Option<u32>,
    /// Stable element label such as `table-0`.
    pub label: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Where a converted document came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOrigin {
    pub filename: String,
    pub mimetype: String,
    /// Lowercase hex SHA-256 of the source bytes.
    pub binary_hash: String,
}

impl DocumentOrigin {
    pub fn from_bytes(filename: &str, mimetype: &str, bytes: &[u8]) -> Self {
        Self {
            filename: filename.to_string(),
            mimetype: mimetype.to_string(),
            binary_hash: format!("{:x}", Sha256::digest(bytes)),
        }
    }
}

/// Render a table grid one row per line, cells separated by ` | `.
pub fn render_table(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| row.join(" | "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ordered tree of structural nodes. Owns every node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTree {
    pub origin: DocumentOrigin,
    nodes: Vec<DocumentNode>,
    table_count: usize,
}

impl DocumentTree {
    pub fn new(origin: DocumentOrigin) -> Self {
        let root = DocumentNode {
            id: NodeId::ROOT,
            kind: NodeKind::Root,
            text: None,
            cells: Vec::new(),
            page: None,
            label: None,
            parent: None,
            children: Vec::new(),
        };
        Self {
            origin,
            nodes: vec![root],
            table_count: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> Option<&DocumentNode> {
        self.nodes.get(id.0)
    }

    /// Borrow a node by id.
    ///
    /// Panics if `id` was not handed out by this tree.
    pub fn node(&self, id: NodeId) -> &DocumentNode {
        &self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Total node count, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentNode> {
        self.nodes.iter()
    }

    /// Pre-order traversal in reading order.
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    // ── Construction ──────────────────────────────────────────

    fn push(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        text: Option<String>,
        page: Option<u32>,
    ) -> Result<NodeId, CoreError> {
        let parent_node = self
            .nodes
            .get(parent.0)
            .ok_or(CoreError::NodeNotFound(parent.0))?;
        if !parent_node.kind.is_container() {
            return Err(CoreError::NotAContainer(parent.0));
        }
        if let NodeKind::Heading { level } = kind {
            if !(1..=6).contains(&level) {
                return Err(CoreError::InvalidHeadingLevel(level));
            }
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(DocumentNode {
            id,
            kind,
            text,
            cells: Vec::new(),
            page,
            label: None,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Append a layout container (page, section or list).
    pub fn add_container(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        page: Option<u32>,
    ) -> Result<NodeId, CoreError> {
        self.push(parent, kind, None, page)
    }

    pub fn add_heading(
        &mut self,
        parent: NodeId,
        level: u8,
        text: impl Into<String>,
        page: Option<u32>,
    ) -> Result<NodeId, CoreError> {
        self.push(parent, NodeKind::Heading { level }, Some(text.into()), page)
    }

    pub fn add_paragraph(
        &mut self,
        parent: NodeId,
        text: impl Into<String>,
        page: Option<u32>,
    ) -> Result<NodeId, CoreError> {
        self.push(parent, NodeKind::Paragraph, Some(text.into()), page)
    }

    pub fn add_list_item(
        &mut self,
        parent: NodeId,
        text: impl Into<String>,
        page: Option<u32>,
    ) -> Result<NodeId, CoreError> {
        self.push(parent, NodeKind::ListItem, Some(text.into()), page)
    }

    /// Append a table; tables are labelled `table-<n>` in insertion order.
    pub fn add_table(
        &mut self,
        parent: NodeId,
        rows: Vec<Vec<String>>,
        page: Option<u32>,
    ) -> Result<NodeId, CoreError> {
        let id = self.push(parent, NodeKind::Table, Some(render_table(&rows)), page)?;
        let node = &mut self.nodes[id.0];
        node.cells = rows;
        node.label = Some(format!("table-{}", self.table_count));
        self.table_count += 1;
        Ok(id)
    }

    // ── Export ────────────────────────────────────────────────

    /// Plain-text rendering: every text-bearing node in reading order,
    /// separated by a blank line.
    pub fn export_text(&self) -> String {
        self.depth_first()
            .into_iter()
            .filter_map(|id| self.node(id).text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Markdown rendering used by batch conversion.
    pub fn export_markdown(&self) -> String {
        let mut blocks: Vec<String> = Vec::new();
        let mut open_list: Option<NodeId> = None;

        for id in self.depth_first() {
            let node = self.node(id);
            let Some(text) = node.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
                continue;
            };

            if node.kind == NodeKind::ListItem {
                let item = format!("- {}", text.split_whitespace().collect::<Vec<_>>().join(" "));
                match (open_list, blocks.last_mut()) {
                    (Some(list), Some(last)) if node.parent == Some(list) => {
                        last.push('\n');
                        last.push_str(&item);
                    }
                    _ => blocks.push(item),
                }
                open_list = node.parent;
                continue;
            }
            open_list = None;

            let block = if let Some(level) = node.kind.heading_level() {
                format!("{} {}", "#".repeat(level as usize), text)
            } else if node.kind == NodeKind::Table && !node.cells.is_empty() {
                markdown_table(&node.cells)
            } else {
                text.to_string()
            };
            blocks.push(block);
        }

        blocks.join("\n\n")
    }
}

fn markdown_table(rows: &[Vec<String>]) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let line = |row: &[String]| {
        let mut cells: Vec<&str> = row.iter().map(String::as_str).collect();
        cells.resize(width, "");
        format!("| {} |", cells.join(" | "))
    };

    let mut out = Vec::with_capacity(rows.len() + 1);
    if let Some((header, body)) = rows.split_first() {
        out.push(line(header));
        out.push(format!("|{}", " --- |".repeat(width)));
        out.extend(body.iter().map(|r| line(r)));
    }
    out.join("\n")
}
