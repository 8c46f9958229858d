//! Text normalization used when cutting chunks.

use pagechunk_core::{DocumentNode, NodeKind};

/// Collapse every whitespace run to a single space and trim.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize each line but keep line breaks; blank lines are dropped.
pub(crate) fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(normalize_whitespace)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalized text of a text-bearing node, `None` when nothing is left.
pub(crate) fn node_text(node: &DocumentNode) -> Option<String> {
    let raw = node.text.as_deref()?;
    let text = match node.kind {
        NodeKind::Table => normalize_lines(raw),
        _ => normalize_whitespace(raw),
    };
    (!text.is_empty()).then_some(text)
}
