//! Integration tests for docsift-extractor
//!
//! Builds real PDF and DOCX files in memory and runs them through `extract`.

use docsift_extractor::{extract, ExtractionError};
use std::io::{Cursor, Write};

/// Generate a PDF with one page per entry, each showing the given text.
fn make_pdf(pages: &[&str]) -> Vec<u8> {
    use lopdf::dictionary;
    use lopdf::{Document, Object, Stream};

    let mut doc = Document::with_version("1.4");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = format!("BT /F1 12 Tf 100 700 Td ({}) Tj ET", text);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Generate a minimal DOCX archive whose body holds the given paragraphs.
fn make_docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );
    make_zip(&[("word/document.xml", xml.as_str())])
}

fn make_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn test_pdf_single_page() {
    let pdf = make_pdf(&["Hello World from Docsift"]);
    let text = extract(&pdf, "letter.pdf").unwrap();
    assert!(text.contains("Hello"), "Expected 'Hello' in extracted text, got: {text}");
}

#[test]
fn test_pdf_pages_in_order() {
    let pdf = make_pdf(&["FirstPage", "SecondPage", "ThirdPage"]);
    let text = extract(&pdf, "REPORT.PDF").unwrap();

    let first = text.find("FirstPage").expect("first page text");
    let second = text.find("SecondPage").expect("second page text");
    let third = text.find("ThirdPage").expect("third page text");
    assert!(first < second && second < third, "Pages out of order: {text}");
}

#[test]
fn test_legacy_doc_binary_is_an_encoding_error() {
    // .doc is not parsed natively; OLE headers are not UTF-8
    let ole_header = [0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1];
    let result = extract(&ole_header, "legacy.doc");
    assert!(matches!(result, Err(ExtractionError::Encoding(_))));
}

#[test]
fn test_docx_body_text() {
    let docx = make_docx(&["Curriculum Vitae", "Alice Smith", "Rust engineer"]);
    let text = extract(&docx, "cv.docx").unwrap();
    assert_eq!(text, "Curriculum Vitae\nAlice Smith\nRust engineer");
}

#[test]
fn test_docx_extension_is_case_insensitive() {
    let docx = make_docx(&["Hello"]);
    assert_eq!(extract(&docx, "CV.DOCX").unwrap(), "Hello");
}

#[test]
fn test_docx_without_document_part_fails() {
    let archive = make_zip(&[("word/styles.xml", "<w:styles/>")]);
    let result = extract(&archive, "broken.docx");
    match result {
        Err(ExtractionError::Docx(msg)) => assert!(msg.contains("word/document.xml")),
        other => panic!("Expected Docx error, got {:?}", other),
    }
}

#[test]
fn test_extraction_error_carries_cause() {
    let err = extract(b"nope", "x.docx").unwrap_err();
    assert!(err.to_string().starts_with("Failed to extract DOCX"));
}
