pub mod config;
mod error;
pub mod export;
mod fonts;
pub mod model;
pub mod pdf;
pub mod sheet;
pub mod source;
pub mod templates;

pub use config::{ExportConfig, PageGeometry};
pub use error::{Error, Result};
pub use export::{Artifact, Exporter, LogProgress, Progress};
pub use fonts::FontFace;
pub use model::{AllFormsExport, Cell, CellGrid, ExtractedData, Field, FormExport, FormRecord, Section, TemplateGroup};
pub use sheet::workbook::{Sheet, Workbook};
pub use sheet::{NamedGrid, SheetProjector, ViewStrategy};
pub use source::{FormSource, JsonFileSource};

use std::borrow::Cow;
use std::time::Instant;

fn prepared_form<'a>(form: &'a FormExport, config: &ExportConfig) -> Cow<'a, FormExport> {
    if !config.complete_with_template {
        return Cow::Borrowed(form);
    }
    let mut completed = form.clone();
    completed.extracted_data = templates::complete_with_template(&form.template_type, &form.extracted_data);
    Cow::Owned(completed)
}

fn prepared_all_forms<'a>(export: &'a AllFormsExport, config: &ExportConfig) -> Cow<'a, AllFormsExport> {
    if !config.complete_with_template {
        return Cow::Borrowed(export);
    }
    let mut groups = TemplateGroup::new();
    for (template, records) in export.forms_by_template.iter() {
        let completed = records
            .iter()
            .map(|r| FormRecord {
                extracted_data: templates::complete_with_template(template, &r.extracted_data),
                ..r.clone()
            })
            .collect();
        groups = groups.with_records(template, completed);
    }
    Cow::Owned(AllFormsExport {
        forms_by_template: groups,
        ..export.clone()
    })
}

/// Lay out and encode one form as PDF bytes.
pub fn render_form_pdf(form: &FormExport, exported_at: &str, config: &ExportConfig) -> Result<Vec<u8>> {
    let t0 = Instant::now();

    let form = prepared_form(form, config);
    let doc = pdf::compose(&form, exported_at, config)?;
    let t_layout = t0.elapsed();

    let bytes = pdf::render(&doc)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: layout={:.1}ms, encode={:.1}ms, total={:.1}ms (pages {}, output {} bytes)",
        t_layout.as_secs_f64() * 1000.0,
        (t_total - t_layout).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        doc.page_count(),
        bytes.len(),
    );

    Ok(bytes)
}

/// Project one form into an assembled workbook using `config.form_views`.
pub fn form_workbook(form: &FormExport, exported_at: &str, config: &ExportConfig) -> Workbook {
    let form = prepared_form(form, config);
    let grids = SheetProjector::new(&config.form_views).project_form(&form, exported_at);
    sheet::workbook::assemble(grids)
}

pub fn render_form_xlsx(form: &FormExport, exported_at: &str, config: &ExportConfig) -> Result<Vec<u8>> {
    let t0 = Instant::now();

    let workbook = form_workbook(form, exported_at, config);
    let t_project = t0.elapsed();

    let bytes = workbook.to_xlsx_bytes()?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: project={:.1}ms, encode={:.1}ms, total={:.1}ms (sheets {}, output {} bytes)",
        t_project.as_secs_f64() * 1000.0,
        (t_total - t_project).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        workbook.len(),
        bytes.len(),
    );

    Ok(bytes)
}

/// Project a multi-form export into an assembled workbook using
/// `config.all_forms_views`.
pub fn all_forms_workbook(export: &AllFormsExport, config: &ExportConfig) -> Workbook {
    let export = prepared_all_forms(export, config);
    let grids = SheetProjector::new(&config.all_forms_views).project_all_forms(&export);
    sheet::workbook::assemble(grids)
}

pub fn render_all_forms_xlsx(export: &AllFormsExport, config: &ExportConfig) -> Result<Vec<u8>> {
    let t0 = Instant::now();

    let workbook = all_forms_workbook(export, config);
    let t_project = t0.elapsed();

    let bytes = workbook.to_xlsx_bytes()?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: project={:.1}ms, encode={:.1}ms, total={:.1}ms (forms {}, sheets {}, output {} bytes)",
        t_project.as_secs_f64() * 1000.0,
        (t_total - t_project).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        export.forms_by_template.form_count(),
        workbook.len(),
        bytes.len(),
    );

    Ok(bytes)
}
