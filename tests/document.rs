mod common;

use form_export::pdf::{self, DocumentComposer, DrawOp, RenderedDocument, TextRole};
use form_export::{Error, ExportConfig, ExtractedData, PageGeometry, Section};

fn compose(form: &form_export::FormExport) -> RenderedDocument {
    pdf::compose(form, common::EXPORTED_AT, &ExportConfig::default()).expect("compose")
}

fn texts(doc: &RenderedDocument, role: TextRole) -> Vec<&str> {
    doc.texts_with_role(role)
        .into_iter()
        .filter_map(DrawOp::text_content)
        .collect()
}

#[test]
fn invoice_renders_on_one_page() {
    common::init_logging();
    let doc = compose(&common::invoice());

    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.title, "Invoice Form");
    assert_eq!(texts(&doc, TextRole::Title), ["Invoice Form"]);
    assert_eq!(
        texts(&doc, TextRole::Subtitle),
        ["Original File: scan.png", "Exported on: 2024-03-01 10:15:00"]
    );
    assert_eq!(texts(&doc, TextRole::TocEntry), ["1. Header"]);
    assert_eq!(texts(&doc, TextRole::SectionHeader), ["Header"]);
    assert_eq!(texts(&doc, TextRole::TableHeader), ["Field", "Value"]);
    assert_eq!(texts(&doc, TextRole::Cell), ["No", "7", "Date", "2024-01-01"]);
    assert_eq!(texts(&doc, TextRole::Footer), ["Page 1 of 1"]);
}

#[test]
fn empty_data_still_yields_one_page() {
    let mut form = common::invoice();
    form.extracted_data = ExtractedData::new();
    let doc = compose(&form);

    assert_eq!(doc.page_count(), 1);
    assert_eq!(texts(&doc, TextRole::Title), ["Invoice Form"]);
    assert!(texts(&doc, TextRole::TocHeading).is_empty());
    assert!(texts(&doc, TextRole::SectionHeader).is_empty());
    assert_eq!(texts(&doc, TextRole::Footer), ["Page 1 of 1"]);
}

#[test]
fn section_without_fields_gets_header_row() {
    let mut form = common::invoice();
    form.extracted_data = ExtractedData::new().with_section(Section::new("Empty"));
    let doc = compose(&form);

    assert_eq!(texts(&doc, TextRole::SectionHeader), ["Empty"]);
    assert_eq!(texts(&doc, TextRole::TableHeader), ["Field", "Value"]);
    assert!(texts(&doc, TextRole::Cell).is_empty());
}

#[test]
fn long_form_paginates_with_footers() {
    let form = common::form_with_sections(&[30, 30, 30]);
    let doc = compose(&form);
    let n = doc.page_count();
    assert!(n > 1, "90 rows cannot fit one page");

    let expected: Vec<String> = (1..=n).map(|i| format!("Page {i} of {n}")).collect();
    assert_eq!(texts(&doc, TextRole::Footer), expected);
    for page in &doc.pages {
        assert_eq!(page.texts_with_role(TextRole::Footer).count(), 1);
    }

    assert_eq!(
        texts(&doc, TextRole::SectionHeader),
        ["Section 1", "Section 2", "Section 3"]
    );
    assert_eq!(texts(&doc, TextRole::Cell).len(), 90 * 2);
}

#[test]
fn body_stays_above_content_bottom() {
    let doc = compose(&common::form_with_sections(&[12, 40, 3, 25, 60]));
    let bottom = doc.geometry.content_bottom;

    for page in &doc.pages {
        for op in &page.ops {
            if matches!(op, DrawOp::Text { role: TextRole::Footer, .. }) {
                continue;
            }
            assert!(op.bottom() <= bottom, "page {}: {op:?}", page.number);
        }
    }
}

#[test]
fn section_header_shares_page_with_first_row() {
    // Section sizes chosen so several section starts land near a page foot.
    let doc = compose(&common::form_with_sections(&[29, 1, 31, 2, 28, 4]));

    let flat: Vec<(usize, &DrawOp)> = doc
        .pages
        .iter()
        .flat_map(|p| p.ops.iter().map(move |op| (p.number, op)))
        .collect();
    for (i, (page, op)) in flat.iter().enumerate() {
        if !matches!(op, DrawOp::Text { role: TextRole::SectionHeader, .. }) {
            continue;
        }
        let first_cell = flat[i..]
            .iter()
            .find(|(_, op)| matches!(op, DrawOp::Text { role: TextRole::Cell, .. }))
            .expect("every section has a row");
        assert_eq!(first_cell.0, *page, "{:?} orphaned", op.text_content());
    }
}

#[test]
fn toc_lists_sections_and_can_be_disabled() {
    let form = common::form_with_sections(&[1, 1, 1]);
    let geometry = PageGeometry::default();

    let with_toc = DocumentComposer::new(&geometry, true)
        .compose(&form, common::EXPORTED_AT)
        .expect("compose");
    assert_eq!(texts(&with_toc, TextRole::TocHeading), ["Form Sections:"]);
    assert_eq!(
        texts(&with_toc, TextRole::TocEntry),
        ["1. Section 1", "2. Section 2", "3. Section 3"]
    );

    let without = DocumentComposer::new(&geometry, false)
        .compose(&form, common::EXPORTED_AT)
        .expect("compose");
    assert!(texts(&without, TextRole::TocHeading).is_empty());
    assert!(texts(&without, TextRole::TocEntry).is_empty());
    assert_eq!(texts(&without, TextRole::SectionHeader).len(), 3);
}

#[test]
fn composition_is_idempotent() {
    let form = common::form_with_sections(&[5, 50, 7]);
    assert_eq!(compose(&form), compose(&form));
}

#[test]
fn geometry_that_cannot_hold_a_section_is_rejected() {
    let geometry = PageGeometry {
        content_bottom: 40.0,
        ..PageGeometry::default()
    };
    let err = DocumentComposer::new(&geometry, true)
        .compose(&common::invoice(), common::EXPORTED_AT)
        .expect_err("geometry too small");
    assert!(matches!(err, Error::InvalidGeometry(_)), "{err}");
}

#[test]
fn encoded_pdf_has_signature_and_page_count() {
    let doc = compose(&common::form_with_sections(&[40, 40]));
    let bytes = pdf::render(&doc).expect("render");

    assert!(common::is_pdf(&bytes));
    let count = format!("/Count {}", doc.page_count());
    assert!(
        bytes.windows(count.len()).any(|w| w == count.as_bytes()),
        "missing {count}"
    );

    let out = common::output_dir("document").join("two_sections.pdf");
    std::fs::write(&out, &bytes).expect("write pdf");
}
