use pagechunk_core::{DocumentOrigin, DocumentTree};

use super::layout::{append_blocks, parse_blocks, LayoutRules};
use super::{decode_utf8, ConversionError};

pub fn convert_txt(bytes: &[u8], origin: DocumentOrigin) -> Result<DocumentTree, ConversionError> {
    // Try UTF-8 first, fall back to lossy conversion
    let text = decode_utf8(bytes);
    let mut tree = DocumentTree::new(origin);
    let root = tree.root();
    append_blocks(&mut tree, root, parse_blocks(&text, LayoutRules::TEXT), None)?;
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(content: &[u8]) -> DocumentTree {
        convert_txt(content, DocumentOrigin::from_bytes("t.txt", "text/plain", content)).unwrap()
    }

    #[test]
    fn extract_simple_text() {
        let tree = convert(b"Hello, world!\nThis is a test file.");
        assert_eq!(tree.children(tree.root()).len(), 1);
        assert_eq!(tree.export_text(), "Hello, world! This is a test file.");
    }

    #[test]
    fn extract_utf8_text() {
        let content = "Ünïcödé text with émojis 🎉".as_bytes();
        assert_eq!(convert(content).export_text(), "Ünïcödé text with émojis 🎉");
    }

    #[test]
    fn invalid_utf8_is_lossy() {
        let tree = convert(b"ok \xff bytes");
        assert!(tree.export_text().starts_with("ok "));
    }

    #[test]
    fn extract_empty_text() {
        assert!(convert(b"").is_empty());
    }

    #[test]
    fn hash_lines_are_plain_text() {
        let tree = convert(b"# not a heading");
        assert!(tree.iter().all(|n| n.kind.heading_level().is_none()));
    }
}
