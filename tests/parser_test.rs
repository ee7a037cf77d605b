//! Integration tests for the PDF accessor.

mod common;

use std::io::Cursor;

use common::{line, LinkTarget, PageSpec, PdfBuilder, A4};
use thesischeck::{parse_bytes, parse_reader, Error, ParseOptions, PdfParser, TocEntry};

fn sized(text: &'static str, x: i64, y: i64, size: i64) -> common::Line {
    common::Line { text, x, y, size }
}

#[test]
fn test_page_geometry() {
    let pdf = PdfBuilder::new()
        .page(PageSpec::new(vec![line("A4 page", 72, 700)]))
        .page(PageSpec::new(vec![line("Letter page", 72, 700)]).with_media_box([0, 0, 612, 792]))
        .build();

    let doc = parse_bytes(&pdf).unwrap();
    assert_eq!(doc.page_count(), 2);

    let first = doc.get_page(1).unwrap();
    assert_eq!((first.width_mm(), first.height_mm()), (210, 297));

    let second = doc.get_page(2).unwrap();
    assert_eq!((second.width_mm(), second.height_mm()), (216, 279));
}

#[test]
fn test_crop_box_and_rotation() {
    let pdf = PdfBuilder::new()
        .page(PageSpec::new(vec![line("Landscape", 72, 500)]).with_rotate(90))
        .page(PageSpec::new(vec![line("Cropped", 72, 500)]).with_crop_box([0, 0, 500, 700]))
        .page(PageSpec::new(vec![line("Turned back", 72, 500)]).with_rotate(-180))
        .build();

    let doc = parse_bytes(&pdf).unwrap();

    let rotated = doc.get_page(1).unwrap();
    assert_eq!((rotated.width_mm(), rotated.height_mm()), (297, 210));

    let cropped = doc.get_page(2).unwrap();
    assert_eq!((cropped.width_mm(), cropped.height_mm()), (176, 247));
    // Text is placed relative to the top of the crop box
    assert!((cropped.blocks[0].rect.y1 - 202.4).abs() < 0.01);

    let upside_down = doc.get_page(3).unwrap();
    assert_eq!((upside_down.width_mm(), upside_down.height_mm()), (210, 297));
}

#[test]
fn test_content_stream_storage() {
    let lines = || {
        vec![
            line("First paragraph text", 72, 700),
            line("continues here", 72, 686),
        ]
    };

    // Unfiltered single stream, unfiltered array, and Flate-compressed array
    let plain = PdfBuilder::new().page(PageSpec::new(lines())).build();
    let split = PdfBuilder::new()
        .page(PageSpec::new(lines()).with_split_contents())
        .build();
    let compressed = PdfBuilder::new()
        .compressed()
        .page(PageSpec::new(lines()).with_split_contents())
        .build();

    for pdf in [plain, split, compressed] {
        let doc = parse_bytes(&pdf).unwrap();
        let page = doc.get_page(1).unwrap();
        assert_eq!(page.words.len(), 5);
        assert_eq!(page.last_word().unwrap().text, "here");
    }
}

#[test]
fn test_text_blocks_and_words() {
    let pdf = PdfBuilder::new()
        .page(PageSpec::new(vec![
            sized("1", 297, 800, 10),
            sized("Introduction", 72, 740, 16),
            line("First paragraph text", 72, 700),
            line("continues here", 72, 686),
        ]))
        .build();

    let doc = parse_bytes(&pdf).unwrap();
    let page = doc.get_page(1).unwrap();

    assert_eq!(page.blocks.len(), 3);
    assert_eq!(page.blocks[0].text, "1");
    assert_eq!(page.blocks[1].text, "Introduction");
    assert_eq!(page.blocks[2].text, "First paragraph text\ncontinues here");

    // Top-left origin: the page number sits above the heading
    assert!(page.blocks[0].rect.y0 < page.blocks[1].rect.y0);
    assert!((page.blocks[0].rect.x0 - 297.0).abs() < 0.01);

    assert_eq!(page.first_word().unwrap().text, "1");
    assert_eq!(page.last_word().unwrap().text, "here");
    assert_eq!(page.words.len(), 7);
}

#[test]
fn test_search_ignores_spacing_and_line_breaks() {
    let pdf = PdfBuilder::new()
        .page(PageSpec::new(vec![
            line("First paragraph text", 72, 700),
            line("continues here", 72, 686),
        ]))
        .build();

    let doc = parse_bytes(&pdf).unwrap();
    assert_eq!(doc.search_count("firstparagraph"), 1);
    assert_eq!(doc.search_count("TEXT CONTINUES"), 1);
    assert_eq!(doc.search_count("missing"), 0);
}

#[test]
fn test_link_destinations() {
    let pdf = PdfBuilder::new()
        .page(
            PageSpec::new(vec![line("List of Figures", 72, 780)]).with_links(vec![
                LinkTarget::Page(2),
                LinkTarget::GoTo(3),
                LinkTarget::Named("fig:1"),
                LinkTarget::Uri("https://example.org"),
            ]),
        )
        .page(PageSpec::new(vec![line("Figure 1", 72, 700)]))
        .page(PageSpec::new(vec![line("Figure 2", 72, 700)]))
        .named_destination("fig:1", 3)
        .build();

    let doc = parse_bytes(&pdf).unwrap();
    let page = doc.get_page(1).unwrap();

    let targets: Vec<Option<u32>> = page.links.iter().map(|l| l.page).collect();
    assert_eq!(targets, vec![Some(2), Some(3), Some(3), None]);
    assert_eq!(page.links[3].uri.as_deref(), Some("https://example.org"));

    let counts = page.link_targets();
    assert_eq!(counts.get(&2), Some(&1));
    assert_eq!(counts.get(&3), Some(&2));

    // Link rectangles are flipped to a top-left origin
    let rect = page.links[0].rect;
    assert!((rect.y0 - 130.0).abs() < 0.01);
    assert!((rect.y1 - 142.0).abs() < 0.01);
    assert!(page.annotations.is_empty());
}

#[test]
fn test_annotations_exclude_links_and_widgets() {
    let pdf = PdfBuilder::new()
        .page(
            PageSpec::new(vec![line("Draft", 72, 700)])
                .with_links(vec![LinkTarget::Page(1)])
                .with_annotations(vec!["Highlight", "Widget", "Text"]),
        )
        .build();

    let doc = parse_bytes(&pdf).unwrap();
    let page = doc.get_page(1).unwrap();

    let subtypes: Vec<&str> = page.annotations.iter().map(|a| a.subtype.as_str()).collect();
    assert_eq!(subtypes, vec!["Highlight", "Text"]);
    assert_eq!(page.annotations[0].contents.as_deref(), Some("note"));
    assert_eq!(page.links.len(), 1);
}

fn outlined() -> Vec<u8> {
    let body = || PageSpec::new(vec![line("Body", 72, 700)]);
    PdfBuilder::new()
        .page(body())
        .page(body())
        .page(body())
        .page(body())
        .bookmark(1, "Introduction", 1)
        .bookmark(1, "Chapter 1", 2)
        .bookmark(2, "Section 1.1", 2)
        .bookmark(2, "Section 1.2", 3)
        .bookmark(1, "Bibliography", 4)
        .build()
}

#[test]
fn test_outline_is_flattened() {
    let doc = parse_bytes(&outlined()).unwrap();

    assert_eq!(
        doc.toc.entries,
        vec![
            TocEntry::new(1, "Introduction", Some(1)),
            TocEntry::new(1, "Chapter 1", Some(2)),
            TocEntry::new(2, "Section 1.1", Some(2)),
            TocEntry::new(2, "Section 1.2", Some(3)),
            TocEntry::new(1, "Bibliography", Some(4)),
        ]
    );
}

#[test]
fn test_section_range() {
    let doc = parse_bytes(&outlined()).unwrap();

    assert_eq!(doc.section_range("introduction").unwrap(), 1..2);
    assert_eq!(doc.section_range("BIBLIOGRAPHY").unwrap(), 4..5);
    assert_eq!(doc.section_range("Section 1.1").unwrap(), 2..3);
    assert!(matches!(
        doc.section_range("List of Tables"),
        Err(Error::SectionNotFound(_))
    ));
}

#[test]
fn test_metadata() {
    let pdf = PdfBuilder::new()
        .page(PageSpec::new(vec![line("Body", 72, 700)]))
        .info("Title", "On Conformance")
        .info("Author", " A. Student ")
        .info("CreationDate", "D:20240115103045+03'00'")
        .build();

    let doc = parse_bytes(&pdf).unwrap();
    assert_eq!(doc.metadata.title.as_deref(), Some("On Conformance"));
    assert_eq!(doc.metadata.field("author"), Some(" A. Student "));
    assert_eq!(doc.metadata.subject, None);
    assert_eq!(doc.metadata.pdf_version, "1.5");
    assert!(doc.metadata.created.is_some());
    assert!(!doc.metadata.encrypted);
}

#[test]
fn test_structure_only() {
    let parser =
        PdfParser::from_bytes_with_options(&outlined(), ParseOptions::new().structure_only())
            .unwrap();
    assert_eq!(parser.page_count(), 4);

    let doc = parser.parse().unwrap();
    assert_eq!(doc.page_count(), 4);
    assert_eq!(doc.toc.len(), 5);
    assert!(doc.pages.iter().all(|p| p.words.is_empty()));
    assert_eq!(doc.get_page(1).unwrap().width_mm(), 210);
}

#[test]
fn test_blank_page() {
    let pdf = PdfBuilder::new()
        .page(PageSpec::new(vec![]))
        .page(PageSpec::new(vec![line("Body", 72, 700)]).with_media_box(A4))
        .build();

    let doc = parse_bytes(&pdf).unwrap();
    assert!(doc.get_page(1).unwrap().is_empty());
    assert!(doc.get_page(1).unwrap().text_bounds().is_none());
    assert!(!doc.get_page(2).unwrap().is_empty());
}

#[test]
fn test_from_reader() {
    let pdf = outlined();
    let doc = parse_reader(Cursor::new(pdf)).unwrap();
    assert_eq!(doc.page_count(), 4);
}

#[test]
fn test_open_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("thesis.pdf");
    std::fs::write(&path, outlined()).unwrap();

    let doc = thesischeck::parse_file(&path).unwrap();
    assert_eq!(doc.page_count(), 4);
}

#[test]
fn test_rejects_non_pdf() {
    assert!(matches!(
        parse_bytes(b"This is pdfTeX, Version 3.14159265"),
        Err(Error::UnknownFormat)
    ));
}
