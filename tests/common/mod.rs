#![allow(dead_code)]

use std::path::PathBuf;

use form_export::{AllFormsExport, ExtractedData, FormExport, FormRecord, Section, TemplateGroup};

pub const EXPORTED_AT: &str = "2024-03-01 10:15:00";

/// Output directory: tests/output/<case>/
pub fn output_dir(case: &str) -> PathBuf {
    let dir = PathBuf::from("tests/output").join(case);
    std::fs::create_dir_all(&dir).ok();
    dir
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The invoice example: one section, two fields.
pub fn invoice() -> FormExport {
    FormExport {
        form_id: "42".into(),
        template_type: "Invoice".into(),
        file_name: "scan.png".into(),
        extracted_data: ExtractedData::new().with_section(
            Section::new("Header")
                .with_field("No", "7")
                .with_field("Date", "2024-01-01"),
        ),
    }
}

pub fn section_with_rows(name: &str, rows: usize) -> Section {
    (0..rows).fold(Section::new(name), |s, i| {
        s.with_field(format!("Field {}", i + 1), format!("Value {}", i + 1))
    })
}

/// A form with one section per entry in `rows_per_section`.
pub fn form_with_sections(rows_per_section: &[usize]) -> FormExport {
    let data = rows_per_section
        .iter()
        .enumerate()
        .fold(ExtractedData::new(), |d, (i, &rows)| {
            d.with_section(section_with_rows(&format!("Section {}", i + 1), rows))
        });
    FormExport {
        form_id: "7".into(),
        template_type: "Test Report".into(),
        file_name: "input.pdf".into(),
        extracted_data: data,
    }
}

pub fn record(form_id: &str, data: ExtractedData) -> FormRecord {
    FormRecord {
        form_id: form_id.into(),
        file_name: format!("{form_id}.png"),
        created_at: "2024-02-01".into(),
        extracted_data: data,
    }
}

/// Two Biodata records, the second missing the Contact section.
pub fn biodata_export() -> AllFormsExport {
    let full = ExtractedData::new()
        .with_section(Section::new("Personal").with_field("Name", "Ada"))
        .with_section(Section::new("Contact").with_field("City", "London"));
    let partial = ExtractedData::new().with_section(Section::new("Personal").with_field("Name", "Alan"));
    AllFormsExport {
        username: "clerk".into(),
        export_date: "2024-03-01".into(),
        forms_by_template: TemplateGroup::new()
            .with_records("Biodata", vec![record("1", full), record("2", partial)]),
    }
}

pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}

pub fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(b"PK")
}
