//! End-to-end runs of the pipeline through the public API, using Markdown
//! input so the fixtures stay readable.

use pagechunk_ingest::chunker::{ChunkerConfig, ElementKind, HierarchicalChunker};
use pagechunk_ingest::{
    ContextStyle, Contextualizer, DocumentFormat, DocumentSource, Pipeline, PipelineError,
};

fn markdown_pipeline() -> Pipeline {
    Pipeline::builder().accept([DocumentFormat::Markdown]).build()
}

fn md(name: &str, body: &str) -> DocumentSource {
    DocumentSource::from_bytes(name, body.as_bytes().to_vec())
}

#[tokio::test]
async fn introduction_example() {
    let doc = markdown_pipeline()
        .run(md("intro.md", "# Introduction\n\nHello world.\n\nSecond para.\n"), false)
        .await
        .unwrap();

    assert_eq!(doc.total_chunks, 2);
    let [first, second] = doc.chunks.as_slice() else {
        panic!("expected two chunks");
    };
    assert_eq!(first.chunk.index, 0);
    assert_eq!(first.chunk.heading_texts(), vec!["Introduction"]);
    assert_eq!(first.contextualized_text, "Introduction\nHello world.");
    assert_eq!(second.chunk.index, 1);
    assert_eq!(second.contextualized_text, "Introduction\nSecond para.");
}

#[tokio::test]
async fn report_structure() {
    let body = "\
# Report

Summary paragraph.

## Methods

We measured things
across two lines.

- first step
- second step

## Results

| metric | value |
|--------|-------|
| recall | 0.91  |

### Caveats

Small sample.
";
    let doc = markdown_pipeline().run(md("report.md", body), false).await.unwrap();

    let trails: Vec<Vec<&str>> = doc.chunks.iter().map(|c| c.chunk.heading_texts()).collect();
    assert_eq!(
        trails,
        vec![
            vec!["Report"],
            vec!["Report", "Methods"],
            vec!["Report", "Methods"],
            vec!["Report", "Methods"],
            vec!["Report", "Results"],
            vec!["Report", "Results", "Caveats"],
        ]
    );

    assert_eq!(doc.chunks[1].chunk.text, "We measured things across two lines.");
    assert_eq!(doc.chunks[2].chunk.meta.element, ElementKind::ListItem);
    let table = &doc.chunks[4].chunk;
    assert_eq!(table.meta.element, ElementKind::Table);
    assert_eq!(table.text, "metric | value\nrecall | 0.91");
    assert_eq!(table.meta.table_id.as_deref(), Some("table-0"));

    for (i, record) in doc.chunks.iter().enumerate() {
        assert_eq!(record.chunk.index, i);
        assert!(record.contextualized_text.contains(&record.chunk.text));
        assert!(record.embedding.is_none());
    }
}

#[tokio::test]
async fn markdown_style_and_merged_lists() {
    let pipeline = Pipeline::builder()
        .accept([DocumentFormat::Markdown])
        .chunker(HierarchicalChunker::new(ChunkerConfig {
            merge_list_items: true,
        }))
        .contextualizer(Contextualizer::new(ContextStyle::Markdown))
        .build();
    let doc = pipeline
        .run(md("steps.md", "# Steps\n\n## Setup\n\n- install\n- configure\n"), false)
        .await
        .unwrap();

    assert_eq!(doc.total_chunks, 1);
    assert_eq!(
        doc.chunks[0].contextualized_text,
        "# Steps\n## Setup\n\ninstall\nconfigure"
    );
}

#[tokio::test]
async fn empty_and_heading_only_documents() {
    for body in ["", "\n\n", "# Only a title\n"] {
        let doc = markdown_pipeline().run(md("empty.md", body), false).await.unwrap();
        assert_eq!(doc.total_chunks, 0, "body {body:?}");
        assert!(doc.chunks.is_empty());
    }
}

#[tokio::test]
async fn plain_text_has_no_heading_context() {
    let pipeline = Pipeline::builder().accept([DocumentFormat::Text]).build();
    let doc = pipeline
        .run(md("notes.txt", "# not a heading here\n\nSecond block."), false)
        .await
        .unwrap();
    assert!(doc.chunks.iter().all(|c| c.chunk.headings.is_empty()));
    assert_eq!(doc.chunks[1].contextualized_text, "Second block.");
}

#[tokio::test]
async fn default_pipeline_is_pdf_only() {
    let err = Pipeline::builder()
        .build()
        .run(md("notes.md", "# A\n\nB"), false)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedInput(_)));
}
