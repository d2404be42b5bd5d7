//! Tabular projections of extracted form data.
//!
//! Every view is a pure function of its input. Views produce [`NamedGrid`]s;
//! [`workbook::assemble`] turns those into uniquely named sheets.

pub mod workbook;

use crate::model::{AllFormsExport, Cell, CellGrid, ExtractedData, FormExport, FormRecord, Section};

/// Which tabular layouts an export emits. Several may be selected at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ViewStrategy {
    /// Overview sheet: form metadata and section list, or per-template counts.
    Summary,
    /// One `[Section, Field, Value]` row per field.
    Triple,
    /// One titled `[Field, Value]` sheet per section.
    SectionDetail,
    /// One two-row sheet per section: field names over values.
    PerSectionWide,
    /// One row per form record, one column per (section, field) seen in any
    /// record of the template. Multi-form exports only.
    CrossFormPivot,
}

/// A cell grid with the label it wants as sheet name.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedGrid {
    pub label: String,
    pub grid: CellGrid,
    /// Index of the column-header row, when the grid has one.
    pub header_row: Option<usize>,
}

impl NamedGrid {
    pub fn new(label: impl Into<String>, grid: CellGrid, header_row: Option<usize>) -> Self {
        Self {
            label: label.into(),
            grid,
            header_row,
        }
    }

    /// Column sizing hints: `max(15, displayLength(header) * 1.2)` per column.
    /// Grids without a header row size each column by its widest cell.
    pub fn column_widths(&self) -> Vec<f64> {
        let ncols = self.grid.iter().map(Vec::len).max().unwrap_or(0);
        (0..ncols)
            .map(|ci| {
                let len = match self.header_row.and_then(|ri| self.grid.get(ri)) {
                    Some(header) => header.get(ci).map_or(0, |c| display_length(&c.text())),
                    None => self
                        .grid
                        .iter()
                        .filter_map(|row| row.get(ci))
                        .map(|c| display_length(&c.text()))
                        .max()
                        .unwrap_or(0),
                };
                column_width(len)
            })
            .collect()
    }
}

pub const MIN_COLUMN_WIDTH: f64 = 15.0;

pub fn column_width(display_len: usize) -> f64 {
    (display_len as f64 * 1.2).max(MIN_COLUMN_WIDTH)
}

/// Display width estimate: wide (non-ASCII) characters count as 1.6.
pub fn display_length(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

fn text_row<I, S>(cells: I) -> Vec<Cell>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    cells.into_iter().map(|s| Cell::Text(s.into())).collect()
}

/// `[Section, Field, Value]` header plus one row per field, section order
/// then field order.
pub fn triple_grid(data: &ExtractedData) -> CellGrid {
    let mut grid = vec![text_row(["Section", "Field", "Value"])];
    grid.extend(triple_rows(data));
    grid
}

fn triple_rows(data: &ExtractedData) -> impl Iterator<Item = Vec<Cell>> + '_ {
    data.sections().iter().flat_map(|section| {
        section
            .fields
            .iter()
            .map(move |f| text_row([section.name.as_str(), f.name.as_str(), f.value.as_str()]))
    })
}

/// Field names over their values, in field order.
pub fn section_wide_grid(section: &Section) -> CellGrid {
    vec![
        text_row(section.fields.iter().map(|f| f.name.as_str())),
        text_row(section.fields.iter().map(|f| f.value.as_str())),
    ]
}

fn section_detail_grid(section: &Section) -> CellGrid {
    let mut grid = vec![text_row([section.name.as_str()]), Vec::new(), text_row(["Field", "Value"])];
    grid.extend(
        section
            .fields
            .iter()
            .map(|f| text_row([f.name.as_str(), f.value.as_str()])),
    );
    grid
}

/// Every (section, field) pair present in any record, in first-seen order.
pub fn pivot_columns(records: &[FormRecord]) -> Vec<(String, String)> {
    let mut columns: Vec<(String, String)> = Vec::new();
    for record in records {
        for section in record.extracted_data.sections() {
            for field in &section.fields {
                let seen = columns
                    .iter()
                    .any(|(s, f)| *s == section.name && *f == field.name);
                if !seen {
                    columns.push((section.name.clone(), field.name.clone()));
                }
            }
        }
    }
    columns
}

/// One row per record under `[Form ID, File Name, Created At, "Section - Field"...]`.
/// A record lacking a column's section or field gets an empty cell.
pub fn pivot_grid(records: &[FormRecord]) -> CellGrid {
    let columns = pivot_columns(records);
    let mut header = text_row(["Form ID", "File Name", "Created At"]);
    header.extend(
        columns
            .iter()
            .map(|(section, field)| Cell::Text(format!("{section} - {field}"))),
    );

    let mut grid = vec![header];
    for record in records {
        let mut row = text_row([
            record.form_id.as_str(),
            record.file_name.as_str(),
            record.created_at.as_str(),
        ]);
        row.extend(columns.iter().map(|(section, field)| {
            let value = record.extracted_data.value(section, field).unwrap_or_default();
            Cell::Text(value.to_string())
        }));
        grid.push(row);
    }
    grid
}

/// Projects forms into named grids for the selected views.
pub struct SheetProjector<'a> {
    views: &'a [ViewStrategy],
}

impl<'a> SheetProjector<'a> {
    pub fn new(views: &'a [ViewStrategy]) -> Self {
        Self { views }
    }

    /// Selected views with `Summary` first and duplicates dropped.
    fn ordered_views(&self) -> Vec<ViewStrategy> {
        let mut ordered = Vec::with_capacity(self.views.len());
        if self.views.contains(&ViewStrategy::Summary) {
            ordered.push(ViewStrategy::Summary);
        }
        for view in self.views {
            if !ordered.contains(view) {
                ordered.push(*view);
            }
        }
        ordered
    }

    pub fn project_form(&self, form: &FormExport, exported_at: &str) -> Vec<NamedGrid> {
        let data = &form.extracted_data;
        let mut out = Vec::new();
        for view in self.ordered_views() {
            match view {
                ViewStrategy::Summary => {
                    let mut grid = vec![
                        text_row([format!("{} Form", form.template_type)]),
                        text_row(["Original File:", form.file_name.as_str()]),
                        text_row(["Export Date:", exported_at]),
                        Vec::new(),
                        text_row(["Form Sections:"]),
                    ];
                    grid.extend(
                        data.sections()
                            .iter()
                            .enumerate()
                            .map(|(i, s)| text_row([format!("{}. {}", i + 1, s.name)])),
                    );
                    out.push(NamedGrid::new("Summary", grid, None));
                }
                ViewStrategy::Triple => {
                    let mut grid = vec![
                        text_row([format!("{} Form - Complete Data", form.template_type)]),
                        Vec::new(),
                    ];
                    grid.extend(triple_grid(data));
                    out.push(NamedGrid::new("All Data", grid, Some(2)));
                }
                ViewStrategy::SectionDetail => {
                    out.extend(data.sections().iter().map(|s| {
                        NamedGrid::new(s.name.as_str(), section_detail_grid(s), Some(2))
                    }));
                }
                ViewStrategy::PerSectionWide => {
                    out.extend(data.sections().iter().map(|s| {
                        NamedGrid::new(format!("{} (wide)", s.name), section_wide_grid(s), Some(0))
                    }));
                }
                ViewStrategy::CrossFormPivot => {
                    log::debug!("pivot view skipped for single-form export of {:?}", form.form_id);
                }
            }
        }
        out
    }

    pub fn project_all_forms(&self, export: &AllFormsExport) -> Vec<NamedGrid> {
        let groups = &export.forms_by_template;
        let mut out = Vec::new();
        for view in self.ordered_views() {
            match view {
                ViewStrategy::Summary => {
                    let mut grid = vec![
                        text_row(["All Forms Export"]),
                        text_row(["User:", export.username.as_str()]),
                        text_row(["Export Date:", export.export_date.as_str()]),
                        Vec::new(),
                        text_row(["Template", "Forms"]),
                    ];
                    grid.extend(groups.iter().map(|(template, records)| {
                        vec![Cell::Text(template.to_string()), Cell::Number(records.len() as f64)]
                    }));
                    out.push(NamedGrid::new("Overview", grid, Some(4)));
                }
                ViewStrategy::CrossFormPivot => {
                    out.extend(
                        groups
                            .iter()
                            .map(|(template, records)| NamedGrid::new(template, pivot_grid(records), Some(0))),
                    );
                }
                ViewStrategy::Triple => {
                    for (template, records) in groups.iter() {
                        out.extend(records.iter().map(|r| {
                            NamedGrid::new(
                                format!("{} {}", r.form_id, template),
                                triple_grid(&r.extracted_data),
                                Some(0),
                            )
                        }));
                    }
                }
                ViewStrategy::SectionDetail => {
                    for (_, records) in groups.iter() {
                        for r in records {
                            out.extend(r.extracted_data.sections().iter().map(|s| {
                                NamedGrid::new(
                                    format!("{} {}", r.form_id, s.name),
                                    section_detail_grid(s),
                                    Some(2),
                                )
                            }));
                        }
                    }
                }
                ViewStrategy::PerSectionWide => {
                    for (_, records) in groups.iter() {
                        for r in records {
                            out.extend(r.extracted_data.sections().iter().map(|s| {
                                NamedGrid::new(
                                    format!("{} {} (wide)", r.form_id, s.name),
                                    section_wide_grid(s),
                                    Some(0),
                                )
                            }));
                        }
                    }
                }
            }
        }
        out
    }
}
