use std::panic::{catch_unwind, AssertUnwindSafe};

use pagechunk_core::{DocumentOrigin, DocumentTree, NodeKind};

use super::layout::{append_blocks, parse_blocks, LayoutRules};
use super::ConversionError;

/// Pull the text layer out of a PDF, one string per page.
///
/// pdf-extract panics on some malformed inputs, so a panic is reported as a
/// conversion failure instead of unwinding into the caller.
fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, ConversionError> {
    match catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    })) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ConversionError::PdfError(e.to_string())),
        Err(_) => Err(ConversionError::PdfError(
            "PDF parser aborted on malformed input".to_string(),
        )),
    }
}

pub fn convert_pdf(bytes: &[u8], origin: DocumentOrigin) -> Result<DocumentTree, ConversionError> {
    let pages = extract_pages(bytes)?;
    pages_to_tree(&pages, origin)
}

/// Build the tree from per-page text. Each non-empty page becomes a `Page`
/// container numbered by its position in the document.
pub(crate) fn pages_to_tree<S: AsRef<str>>(
    pages: &[S],
    origin: DocumentOrigin,
) -> Result<DocumentTree, ConversionError> {
    let mut tree = DocumentTree::new(origin);

    if pages.iter().all(|p| p.as_ref().trim().is_empty()) {
        // Image-only PDFs have no text layer; that is an empty document, not an error.
        tracing::warn!(filename = %tree.origin.filename, "PDF has no extractable text layer");
        return Ok(tree);
    }

    for (i, page_text) in pages.iter().enumerate() {
        let blocks = parse_blocks(page_text.as_ref(), LayoutRules::PDF);
        if blocks.is_empty() {
            continue;
        }
        let page_number = Some(i as u32 + 1);
        let page = tree.add_container(tree.root(), NodeKind::Page, page_number)?;
        append_blocks(&mut tree, page, blocks, page_number)?;
    }

    tracing::debug!(
        filename = %tree.origin.filename,
        pages = pages.len(),
        "PDF text layer extracted"
    );
    Ok(tree)
}
