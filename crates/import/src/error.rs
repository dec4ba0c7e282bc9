use thiserror::Error;

/// Failures that abort a statement import. Numeric coercion never fails; bad
/// cells resolve to zero instead.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("Malformed table: {0}")]
    MalformedTable(String),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::MalformedTable(err.to_string())
    }
}
