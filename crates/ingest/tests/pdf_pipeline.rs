//! Real PDFs through the bundled converter. Fixtures are built in memory
//! with lopdf, one text line per page.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use pagechunk_ingest::chunker::HierarchicalChunker;
use pagechunk_ingest::{DocumentConverter, DocumentSource, Pipeline, StructuredConverter};

fn pdf_with_pages(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for line in lines {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => lines.len() as i64,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn two_page_source() -> DocumentSource {
    DocumentSource::from_bytes(
        "two-pages.pdf",
        pdf_with_pages(&["First page paragraph.", "Second page paragraph."]),
    )
}

#[test]
fn each_pdf_page_is_its_own_container() {
    let tree = StructuredConverter::new().convert(&two_page_source()).unwrap();
    let pages = tree.children(tree.root());
    assert_eq!(pages.len(), 2);
    assert_eq!(tree.node(pages[0]).page, Some(1));
    assert_eq!(tree.node(pages[1]).page, Some(2));
}

#[test]
fn paragraphs_do_not_run_across_pages() {
    let tree = StructuredConverter::new().convert(&two_page_source()).unwrap();
    let chunks = HierarchicalChunker::default().chunk(&tree);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].text, "First page paragraph.");
    assert_eq!(chunks[1].text, "Second page paragraph.");

    let first = chunks[0].meta.pages.unwrap();
    assert_eq!((first.first, first.last), (1, 1));
    let second = chunks[1].meta.pages.unwrap();
    assert_eq!((second.first, second.last), (2, 2));
}

#[tokio::test]
async fn default_pipeline_reads_real_pdf() {
    let doc = Pipeline::builder()
        .build()
        .run(two_page_source(), false)
        .await
        .unwrap();

    assert_eq!(doc.total_chunks, 2);
    assert_eq!(doc.origin.filename, "two-pages.pdf");
    assert!(doc.full_text.contains("First page paragraph."));
    assert!(doc.full_text.contains("Second page paragraph."));
    assert_eq!(doc.chunks[1].chunk.meta.pages.unwrap().first, 2);
}
