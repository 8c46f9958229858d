//! Document conversion: raw bytes → [`DocumentTree`].
//!
//! A [`DocumentConverter`] is the boundary to whatever engine turns a file
//! into structure. The bundled [`StructuredConverter`] handles PDF (text
//! layer), Markdown and plain text through the shared [`layout`] heuristics.

mod layout;
mod md;
mod pdf;
mod txt;

use std::path::{Path, PathBuf};

use thiserror::Error;

use pagechunk_core::{CoreError, DocumentOrigin, DocumentTree};

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("PDF extraction failed: {0}")]
    PdfError(String),
    #[error("Document structure error: {0}")]
    Structure(#[from] CoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Input formats the bundled converters understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Markdown,
    Text,
}

impl DocumentFormat {
    /// Detect the format from a filename extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "md" | "markdown" => Some(Self::Markdown),
            "txt" | "text" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn mimetype(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Markdown => "text/markdown",
            Self::Text => "text/plain",
        }
    }
}

#[derive(Debug, Clone)]
enum SourceContent {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// A document to convert: a display filename plus its bytes or a path to them.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    filename: String,
    content: SourceContent,
}

impl DocumentSource {
    pub fn from_bytes(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content: SourceContent::Bytes(bytes),
        }
    }

    /// Read lazily from `path`; `filename` defaults to the path's file name.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            filename,
            content: SourceContent::Path(path.to_path_buf()),
        }
    }

    /// Read from `path` but report `filename` (e.g. a staged upload).
    pub fn from_staged(filename: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            content: SourceContent::Path(path.into()),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::from_filename(&self.filename)
    }

    /// Materialize the source bytes.
    pub fn read(&self) -> Result<std::borrow::Cow<'_, [u8]>, ConversionError> {
        match &self.content {
            SourceContent::Bytes(b) => Ok(std::borrow::Cow::Borrowed(b)),
            SourceContent::Path(p) => Ok(std::borrow::Cow::Owned(std::fs::read(p)?)),
        }
    }
}

/// Engine boundary: turns a source into a document tree or fails whole.
pub trait DocumentConverter: Send + Sync {
    fn supports(&self, format: DocumentFormat) -> bool;

    fn convert(&self, source: &DocumentSource) -> Result<DocumentTree, ConversionError>;
}

/// Default converter for PDF, Markdown and plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredConverter;

impl StructuredConverter {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentConverter for StructuredConverter {
    fn supports(&self, _format: DocumentFormat) -> bool {
        true
    }

    fn convert(&self, source: &DocumentSource) -> Result<DocumentTree, ConversionError> {
        let format = source
            .format()
            .ok_or_else(|| ConversionError::UnsupportedType(source.filename().to_string()))?;
        let bytes = source.read()?;
        let origin = DocumentOrigin::from_bytes(source.filename(), format.mimetype(), &bytes);

        let tree = match format {
            DocumentFormat::Pdf => pdf::convert_pdf(&bytes, origin)?,
            DocumentFormat::Markdown => md::convert_md(&bytes, origin)?,
            DocumentFormat::Text => txt::convert_txt(&bytes, origin)?,
        };

        tracing::debug!(
            filename = source.filename(),
            nodes = tree.len(),
            "converted document"
        );
        Ok(tree)
    }
}

/// Decode bytes as UTF-8, falling back to lossy conversion.
pub(crate) fn decode_utf8(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_detection() {
        assert_eq!(DocumentFormat::from_filename("a.pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_filename("A.PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_filename("notes.markdown"), Some(DocumentFormat::Markdown));
        assert_eq!(DocumentFormat::from_filename("readme.txt"), Some(DocumentFormat::Text));
        assert_eq!(DocumentFormat::from_filename("image.png"), None);
        assert_eq!(DocumentFormat::from_filename("noext"), None);
    }

    #[test]
    fn unsupported_source_is_rejected() {
        let source = DocumentSource::from_bytes("photo.jpg", vec![1, 2, 3]);
        let err = StructuredConverter::new().convert(&source).unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedType(_)));
    }

    #[test]
    fn missing_path_is_io_error() {
        let source = DocumentSource::from_path("/definitely/not/here.md");
        let err = StructuredConverter::new().convert(&source).unwrap_err();
        assert!(matches!(err, ConversionError::Io(_)));
    }

    #[test]
    fn origin_records_filename_and_mimetype() {
        let source = DocumentSource::from_bytes("notes.md", b"# A\n\nB".to_vec());
        let tree = StructuredConverter::new().convert(&source).unwrap();
        assert_eq!(tree.origin.filename, "notes.md");
        assert_eq!(tree.origin.mimetype, "text/markdown");
        assert_eq!(tree.origin.binary_hash.len(), 64);
    }

    #[test]
    fn malformed_pdf_is_conversion_error() {
        let source = DocumentSource::from_bytes("broken.pdf", b"not a pdf at all".to_vec());
        let err = StructuredConverter::new().convert(&source).unwrap_err();
        assert!(matches!(err, ConversionError::PdfError(_)));
    }
}
