use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The data source could not be reached, answered with a failure, or
    /// returned a payload that is not a form export.
    #[error("Could not fetch form data: {0}")]
    UpstreamFetch(String),

    /// A single block needs more vertical space than an empty page offers.
    #[error("Block of height {needed:.1} cannot fit on a page with {available:.1} of body space")]
    LayoutOverflow { needed: f32, available: f32 },

    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, Error>;
