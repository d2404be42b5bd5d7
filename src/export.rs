//! Export orchestration: fetch, complete, render, name.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::config::ExportConfig;
use crate::error::Error;
use crate::model::FormExport;
use crate::source::FormSource;

/// A finished export file.
#[derive(Clone, Debug, PartialEq)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Write into `dir` under the artifact's own name.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, Error> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// The requested id names the artifact; a single-file source is asked with
/// an empty id, so the payload's own `formId` is used then.
fn artifact_id<'a>(requested: &'a str, form: &'a FormExport) -> &'a str {
    if requested.trim().is_empty() {
        &form.form_id
    } else {
        requested
    }
}

/// `{Template with whitespace runs -> "_"}_Form_{formId}.{ext}`.
pub fn form_file_name(template_type: &str, form_id: &str, ext: &str) -> String {
    let template = template_type.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{template}_Form_{form_id}.{ext}")
}

pub fn all_forms_file_name(date: NaiveDate) -> String {
    format!("All_Forms_Export_{}.xlsx", date.format("%Y-%m-%d"))
}

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Visual feedback around a running export.
pub trait Progress {
    fn begin(&self, task: &str);
    fn end(&self);
}

/// Progress reported through the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn begin(&self, task: &str) {
        log::info!("{task}...");
    }

    fn end(&self) {
        log::debug!("done");
    }
}

/// Ends the progress indicator when dropped, on success and failure alike.
struct ProgressGuard<'a> {
    progress: &'a dyn Progress,
}

impl<'a> ProgressGuard<'a> {
    fn start(progress: &'a dyn Progress, task: &str) -> Self {
        progress.begin(task);
        Self { progress }
    }
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.progress.end();
    }
}

pub struct Exporter<S: FormSource> {
    source: S,
    config: ExportConfig,
    progress: Box<dyn Progress>,
    fixed_time: Option<NaiveDateTime>,
}

impl<S: FormSource> Exporter<S> {
    pub fn new(source: S, config: ExportConfig) -> Self {
        Self {
            source,
            config,
            progress: Box::new(LogProgress),
            fixed_time: None,
        }
    }

    pub fn with_progress(mut self, progress: impl Progress + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Pin the export clock, for reproducible output.
    pub fn at(mut self, time: NaiveDateTime) -> Self {
        self.fixed_time = Some(time);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    fn now(&self) -> NaiveDateTime {
        self.fixed_time.unwrap_or_else(|| Local::now().naive_local())
    }

    fn run<T>(&self, task: &str, f: impl FnOnce() -> Result<T, Error>) -> Result<T, Error> {
        let _guard = ProgressGuard::start(self.progress.as_ref(), task);
        f().inspect_err(|e| log::error!("{task} failed: {e}"))
    }

    pub fn export_form_pdf(&self, form_id: &str) -> Result<Artifact, Error> {
        self.run(&format!("Exporting form {form_id} as PDF"), || {
            let form = self.source.fetch_form(form_id)?;
            let exported_at = self.now().format(TIMESTAMP_FORMAT).to_string();
            let bytes = crate::render_form_pdf(&form, &exported_at, &self.config)?;
            Ok(Artifact {
                file_name: form_file_name(&form.template_type, artifact_id(form_id, &form), "pdf"),
                bytes,
            })
        })
    }

    pub fn export_form_xlsx(&self, form_id: &str) -> Result<Artifact, Error> {
        self.run(&format!("Exporting form {form_id} as XLSX"), || {
            let form = self.source.fetch_form(form_id)?;
            let exported_at = self.now().format(TIMESTAMP_FORMAT).to_string();
            let bytes = crate::render_form_xlsx(&form, &exported_at, &self.config)?;
            Ok(Artifact {
                file_name: form_file_name(&form.template_type, artifact_id(form_id, &form), "xlsx"),
                bytes,
            })
        })
    }

    pub fn export_all_forms_xlsx(&self) -> Result<Artifact, Error> {
        self.run("Exporting all forms as XLSX", || {
            let mut export = self.source.fetch_all_forms()?;
            let now = self.now();
            if export.export_date.trim().is_empty() {
                export.export_date = now.format(TIMESTAMP_FORMAT).to_string();
            }
            let bytes = crate::render_all_forms_xlsx(&export, &self.config)?;
            Ok(Artifact {
                file_name: all_forms_file_name(now.date()),
                bytes,
            })
        })
    }
}
