use pagechunk_core::{DocumentOrigin, DocumentTree};

use super::layout::{append_blocks, parse_blocks, LayoutRules};
use super::{decode_utf8, ConversionError};

pub fn convert_md(bytes: &[u8], origin: DocumentOrigin) -> Result<DocumentTree, ConversionError> {
    let text = decode_utf8(bytes);
    let mut tree = DocumentTree::new(origin);
    let root = tree.root();
    append_blocks(&mut tree, root, parse_blocks(&text, LayoutRules::MARKDOWN), None)?;
    Ok(tree)
}
