//! Offline directory conversion: every `*.pdf` in a folder becomes one output file.
//!
//! A failure on one file is logged and recorded in the [`BatchSummary`]; it
//! never stops the rest of the run.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::document::DocumentSource;
use crate::pipeline::{Pipeline, PipelineError};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What to write for each input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutput {
    /// `<stem>.md`
    Markdown,
    /// `<stem>.chunks.json`, optionally with embeddings.
    Chunks { embed: bool },
}

impl BatchOutput {
    fn file_name(&self, stem: &str) -> String {
        match self {
            Self::Markdown => format!("{stem}.md"),
            Self::Chunks { .. } => format!("{stem}.chunks.json"),
        }
    }
}

#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub result: Result<PathBuf, String>,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub found: usize,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// PDFs directly inside `dir` (no recursion), sorted by path.
pub fn find_pdfs(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|e| e.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

/// Convert every PDF in `input_dir`, writing results into `output_dir`.
pub async fn run_batch(
    pipeline: &Pipeline,
    input_dir: &Path,
    output_dir: &Path,
    output: BatchOutput,
) -> Result<BatchSummary, BatchError> {
    let files = find_pdfs(input_dir);
    let mut summary = BatchSummary {
        found: files.len(),
        outcomes: Vec::with_capacity(files.len()),
    };

    if files.is_empty() {
        warn!("No PDF files found in {}", input_dir.display());
        return Ok(summary);
    }
    info!("Found {} PDF files in {}", files.len(), input_dir.display());

    std::fs::create_dir_all(output_dir)?;

    for input in files {
        let result = match process_file(pipeline, &input, output_dir, output).await {
            Ok(path) => {
                info!(input = %input.display(), "saved {}", path.display());
                Ok(path)
            }
            Err(e) => {
                error!(input = %input.display(), error = %e, "failed to process");
                Err(e.to_string())
            }
        };
        summary.outcomes.push(FileOutcome { input, result });
    }

    info!(
        found = summary.found,
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        "batch complete"
    );
    Ok(summary)
}

async fn process_file(
    pipeline: &Pipeline,
    input: &Path,
    output_dir: &Path,
    output: BatchOutput,
) -> Result<PathBuf, BatchError> {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let target = output_dir.join(output.file_name(&stem));
    let source = DocumentSource::from_path(input);

    let contents = match output {
        BatchOutput::Markdown => {
            let p = pipeline.clone();
            let prepared = tokio::task::spawn_blocking(move || p.prepare(&source))
                .await
                .map_err(|e| PipelineError::Task(e.to_string()))??;
            prepared.tree.export_markdown()
        }
        BatchOutput::Chunks { embed } => {
            let doc = pipeline.run(source, embed).await?;
            serde_json::to_string_pretty(&doc)?
        }
    };

    tokio::fs::write(&target, contents).await?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::document::{
        ConversionError, DocumentConverter, DocumentFormat, StructuredConverter,
    };
    use pagechunk_core::DocumentTree;

    /// Reads `.pdf` fixtures as Markdown so tests need no binary PDFs.
    /// Files starting with `!` fail conversion.
    struct MarkdownAsPdf;

    impl DocumentConverter for MarkdownAsPdf {
        fn supports(&self, format: DocumentFormat) -> bool {
            format == DocumentFormat::Pdf
        }

        fn convert(&self, source: &DocumentSource) -> Result<DocumentTree, ConversionError> {
            let bytes = source.read()?.into_owned();
            if bytes.starts_with(b"!") {
                return Err(ConversionError::PdfError("bad xref table".into()));
            }
            let mut tree = StructuredConverter::new()
                .convert(&DocumentSource::from_bytes("fixture.md", bytes))?;
            tree.origin.filename = source.filename().to_string();
            Ok(tree)
        }
    }

    fn pipeline() -> Pipeline {
        Pipeline::builder().converter(Arc::new(MarkdownAsPdf)).build()
    }

    fn write(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn finds_only_top_level_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.pdf", "x");
        write(dir.path(), "a.PDF", "x");
        write(dir.path(), "notes.txt", "x");
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        write(&dir.path().join("nested"), "c.pdf", "x");

        let names: Vec<String> = find_pdfs(dir.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[tokio::test]
    async fn empty_input_dir_reports_nothing() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let summary = run_batch(&pipeline(), input.path(), output.path(), BatchOutput::Markdown)
            .await
            .unwrap();
        assert_eq!(summary.found, 0);
        assert!(summary.outcomes.is_empty());
    }

    #[tokio::test]
    async fn markdown_output_and_failures_do_not_abort() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let out_dir = output.path().join("md");
        write(input.path(), "a.pdf", "# Intro\n\nHello world.\n");
        write(input.path(), "b.pdf", "!corrupt");
        write(input.path(), "c.pdf", "- one\n- two\n");

        let summary = run_batch(&pipeline(), input.path(), &out_dir, BatchOutput::Markdown)
            .await
            .unwrap();

        assert_eq!(summary.found, 3);
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 1);
        assert!(summary.outcomes[1].result.as_ref().unwrap_err().contains("bad xref"));

        let a = std::fs::read_to_string(out_dir.join("a.md")).unwrap();
        assert_eq!(a, "# Intro\n\nHello world.");
        let c = std::fs::read_to_string(out_dir.join("c.md")).unwrap();
        assert_eq!(c, "- one\n- two");
        assert!(!out_dir.join("b.md").exists());
    }

    #[tokio::test]
    async fn chunks_output_is_json_records() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(
            input.path(),
            "report.pdf",
            "# Introduction\n\nHello world.\n\nSecond para.\n",
        );

        let summary = run_batch(
            &pipeline(),
            input.path(),
            output.path(),
            BatchOutput::Chunks { embed: false },
        )
        .await
        .unwrap();
        assert_eq!(summary.succeeded(), 1);

        let raw = std::fs::read_to_string(output.path().join("report.chunks.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["total_chunks"], 2);
        assert_eq!(json["chunks"][1]["contextualized_text"], "Introduction\nSecond para.");
        assert_eq!(json["origin"]["filename"], "report.pdf");
    }

    #[tokio::test]
    async fn embed_without_embedder_fails_per_file() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write(input.path(), "a.pdf", "text");

        let summary = run_batch(
            &pipeline(),
            input.path(),
            output.path(),
            BatchOutput::Chunks { embed: true },
        )
        .await
        .unwrap();
        assert_eq!(summary.failed(), 1);
    }
}
