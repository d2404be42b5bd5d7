//! Where export payloads come from.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::model::{AllFormsExport, FormExport};

/// Fetches export payloads. Failures surface as [`Error::UpstreamFetch`].
pub trait FormSource {
    fn fetch_form(&self, form_id: &str) -> Result<FormExport, Error>;
    fn fetch_all_forms(&self) -> Result<AllFormsExport, Error>;
}

impl<S: FormSource + ?Sized> FormSource for &S {
    fn fetch_form(&self, form_id: &str) -> Result<FormExport, Error> {
        (**self).fetch_form(form_id)
    }

    fn fetch_all_forms(&self) -> Result<AllFormsExport, Error> {
        (**self).fetch_all_forms()
    }
}

pub const ALL_FORMS_FILE: &str = "all_forms.json";

#[derive(Clone, Debug)]
enum Location {
    /// `<dir>/<form_id>.json` and `<dir>/all_forms.json`.
    Dir(PathBuf),
    /// One payload file, whatever id is asked for.
    File(PathBuf),
}

/// Payloads stored as JSON files on disk.
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    location: Location,
}

impl JsonFileSource {
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::Dir(path.into()),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
        }
    }

    /// Directory source for directories, single-file source otherwise.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            Self::dir(path)
        } else {
            Self::file(path)
        }
    }

    fn form_path(&self, form_id: &str) -> Result<PathBuf, Error> {
        match &self.location {
            Location::File(path) => Ok(path.clone()),
            Location::Dir(dir) => {
                let id = form_id.trim();
                if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
                    return Err(Error::UpstreamFetch(format!("invalid form id {form_id:?}")));
                }
                Ok(dir.join(format!("{id}.json")))
            }
        }
    }

    fn all_forms_path(&self) -> PathBuf {
        match &self.location {
            Location::File(path) => path.clone(),
            Location::Dir(dir) => dir.join(ALL_FORMS_FILE),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::UpstreamFetch(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| Error::UpstreamFetch(format!("{}: malformed payload: {e}", path.display())))
}

impl FormSource for JsonFileSource {
    fn fetch_form(&self, form_id: &str) -> Result<FormExport, Error> {
        let path = self.form_path(form_id)?;
        log::debug!("fetching form {form_id:?} from {}", path.display());
        let form: FormExport = read_json(&path)?;
        if !form_id.is_empty() && !form.form_id.is_empty() && form.form_id != form_id {
            log::warn!(
                "{} holds form {:?}, requested {form_id:?}",
                path.display(),
                form.form_id
            );
        }
        Ok(form)
    }

    fn fetch_all_forms(&self) -> Result<AllFormsExport, Error> {
        let path = self.all_forms_path();
        log::debug!("fetching all forms from {}", path.display());
        read_json(&path)
    }
}
