mod common;

use form_export::sheet::workbook::{self, SHEET_NAME_MAX_LEN, sanitize_sheet_name};
use form_export::sheet::{NamedGrid, SheetProjector, ViewStrategy};
use form_export::{Cell, ExportConfig};

fn named(label: &str) -> NamedGrid {
    NamedGrid::new(label, vec![vec![Cell::from(label)]], None)
}

#[test]
fn forbidden_characters_are_stripped() {
    assert_eq!(sanitize_sheet_name("Q1/Q2 [draft]*?"), "Q1Q2 draft");
    assert_eq!(sanitize_sheet_name("a\\b:c"), "abc");
    assert_eq!(sanitize_sheet_name("'quoted'"), "quoted");
    assert_eq!(sanitize_sheet_name("/*?"), "Sheet");
    assert_eq!(sanitize_sheet_name(""), "Sheet");
}

#[test]
fn long_labels_are_cut_to_31_characters() {
    let name = sanitize_sheet_name("Educational Background And Professional Details");
    assert_eq!(name.chars().count(), SHEET_NAME_MAX_LEN);
    assert_eq!(name, "Educational Background And Prof");
}

#[test]
fn colliding_labels_get_distinct_names() {
    let label = "A/B*Report-12345678901234567890123456789012";
    let book = workbook::assemble(vec![named(label), named(label), named(label)]);

    let names = book.sheet_names();
    assert_eq!(names[0], "ABReport-1234567890123456789012");
    assert_eq!(names[1], "ABReport-1234567890123456789__2");
    assert_eq!(names[2], "ABReport-1234567890123456789__3");
    for name in &names {
        assert!(name.chars().count() <= SHEET_NAME_MAX_LEN, "{name}");
        assert!(!name.contains(['/', '*']));
    }
}

#[test]
fn uniqueness_ignores_case() {
    let book = workbook::assemble(vec![named("Contact"), named("CONTACT"), named("contact")]);
    assert_eq!(book.sheet_names(), ["Contact", "CONTACT__2", "contact__3"]);
}

#[test]
fn suffix_skips_names_already_taken() {
    let book = workbook::assemble(vec![named("Data__2"), named("Data"), named("Data")]);
    assert_eq!(book.sheet_names(), ["Data__2", "Data", "Data__3"]);
}

#[test]
fn order_and_content_are_preserved() {
    let grids = vec![named("Summary"), named("All Data"), named("Header")];
    let book = workbook::assemble(grids.clone());

    assert_eq!(book.len(), 3);
    for (sheet, grid) in book.sheets.iter().zip(&grids) {
        assert_eq!(sheet.name, grid.label);
        assert_eq!(sheet.grid, grid.grid);
        assert_eq!(sheet.column_widths, grid.column_widths());
    }
}

#[test]
fn empty_workbook_still_encodes() {
    let book = workbook::assemble(Vec::new());
    assert!(book.is_empty());
    let bytes = book.to_xlsx_bytes().expect("encode");
    assert!(common::is_zip(&bytes));
}

#[test]
fn form_workbook_encodes_as_xlsx() {
    common::init_logging();
    let config = ExportConfig::default();
    let grids = SheetProjector::new(&config.form_views).project_form(&common::invoice(), common::EXPORTED_AT);
    let book = workbook::assemble(grids);

    assert_eq!(book.sheet_names(), ["Summary", "All Data", "Header"]);
    assert!(book.sheet("All Data").is_some());

    let bytes = book.to_xlsx_bytes().expect("encode");
    assert!(common::is_zip(&bytes));
    std::fs::write(common::output_dir("workbook").join("invoice.xlsx"), &bytes).expect("write xlsx");
}

#[test]
fn sheets_with_sanitized_names_encode() {
    let views = [ViewStrategy::SectionDetail, ViewStrategy::PerSectionWide];
    let mut form = common::invoice();
    form.extracted_data = form.extracted_data.with_section(
        form_export::Section::new("Work/Experience: [years]?").with_field("Total", "5"),
    );
    let book = workbook::assemble(SheetProjector::new(&views).project_form(&form, common::EXPORTED_AT));

    assert_eq!(
        book.sheet_names(),
        ["Header", "WorkExperience years", "Header (wide)", "WorkExperience years (wide)"]
    );
    assert!(common::is_zip(&book.to_xlsx_bytes().expect("encode")));
}
