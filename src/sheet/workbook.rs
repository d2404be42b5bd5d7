use std::collections::BTreeSet;

use rust_xlsxwriter::{Color, Format, FormatBorder, XlsxError};

use crate::error::Error;
use crate::model::{Cell, CellGrid};

use super::NamedGrid;

/// Excel sheet name maximum length.
pub const SHEET_NAME_MAX_LEN: usize = 31;
/// Characters not allowed in sheet names.
pub const FORBIDDEN_SHEET_CHARS: [char; 7] = ['\\', '/', '*', '[', ']', '?', ':'];

/// Strip forbidden characters and cut to 31 characters. Never empty.
pub fn sanitize_sheet_name(label: &str) -> String {
    let stripped: String = label
        .chars()
        .filter(|c| !FORBIDDEN_SHEET_CHARS.contains(c) && !c.is_control())
        .collect();
    // Excel rejects names that start or end with an apostrophe.
    let trimmed = stripped.trim().trim_matches('\'').trim();
    let name: String = trimmed.chars().take(SHEET_NAME_MAX_LEN).collect();
    let name = name.trim_end().trim_end_matches('\'').to_string();
    if name.is_empty() {
        return "Sheet".to_string();
    }
    if name.eq_ignore_ascii_case("history") {
        // Reserved by Excel.
        return format!("{name}_");
    }
    name
}

/// Names already handed out in one workbook. Excel compares sheet names
/// case-insensitively, so the registry does too.
#[derive(Default)]
struct SheetNameRegistry {
    taken: BTreeSet<String>,
}

impl SheetNameRegistry {
    fn claim(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_lowercase()) {
            return name.to_string();
        }

        let mut n_idx = 2usize;
        loop {
            let suffix = format!("__{n_idx}");
            let base: String = name
                .chars()
                .take(SHEET_NAME_MAX_LEN.saturating_sub(suffix.chars().count()))
                .collect();
            let candidate = format!("{base}{suffix}");
            if self.taken.insert(candidate.to_lowercase()) {
                log::debug!("sheet name {name:?} taken; using {candidate:?}");
                return candidate;
            }
            n_idx += 1;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub grid: CellGrid,
    pub header_row: Option<usize>,
    pub column_widths: Vec<f64>,
}

/// Ordered, uniquely named sheets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

/// Turn labelled grids into sheets, keeping their order. Sheet names are
/// sanitized one by one, then made unique across the workbook.
pub fn assemble(named_grids: Vec<NamedGrid>) -> Workbook {
    let mut registry = SheetNameRegistry::default();
    let sheets = named_grids
        .into_iter()
        .map(|named| {
            let column_widths = named.column_widths();
            let name = registry.claim(&sanitize_sheet_name(&named.label));
            Sheet {
                name,
                grid: named.grid,
                header_row: named.header_row,
                column_widths,
            }
        })
        .collect();
    Workbook { sheets }
}

impl Workbook {
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Encode as an XLSX file. A workbook without sheets still encodes, with
    /// the single blank sheet the format requires.
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>, Error> {
        let t0 = std::time::Instant::now();
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let fmt_title = Format::new().set_bold().set_font_size(14);
        let fmt_header = Format::new()
            .set_bold()
            .set_background_color(Color::RGB(0xF0F0F0))
            .set_border(FormatBorder::Thin);

        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;

            for (ri, row) in sheet.grid.iter().enumerate() {
                let format = if sheet.header_row == Some(ri) {
                    Some(&fmt_header)
                } else if ri == 0 && row.len() == 1 {
                    Some(&fmt_title)
                } else {
                    None
                };
                let row_num = cast_row_num(ri)?;
                for (ci, cell) in row.iter().enumerate() {
                    let col_num = cast_col_num(ci)?;
                    match (cell, format) {
                        (Cell::Text(s), Some(f)) => {
                            worksheet.write_string_with_format(row_num, col_num, s, f)?;
                        }
                        (Cell::Text(s), None) => {
                            worksheet.write_string(row_num, col_num, s)?;
                        }
                        (Cell::Number(n), Some(f)) => {
                            worksheet.write_number_with_format(row_num, col_num, *n, f)?;
                        }
                        (Cell::Number(n), None) => {
                            worksheet.write_number(row_num, col_num, *n)?;
                        }
                    }
                }
            }

            for (ci, width) in sheet.column_widths.iter().enumerate() {
                worksheet.set_column_width(cast_col_num(ci)?, *width)?;
            }
        }

        let bytes = workbook.save_to_buffer()?;
        log::info!(
            "XLSX encode: sheets={} bytes={} in {:.1}ms",
            self.sheets.len(),
            bytes.len(),
            t0.elapsed().as_secs_f64() * 1000.0
        );
        Ok(bytes)
    }
}

fn cast_row_num(value: usize) -> Result<u32, Error> {
    u32::try_from(value).map_err(|_| Error::Xlsx(XlsxError::RowColumnLimitError))
}

fn cast_col_num(value: usize) -> Result<u16, Error> {
    u16::try_from(value).map_err(|_| Error::Xlsx(XlsxError::RowColumnLimitError))
}
