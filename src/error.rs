use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the grain database façade.
#[derive(Error, Debug)]
pub enum StarDustError {
    /// An isotope label that is not of the form `Element-MassNumber`.
    #[error("Malformed isotope label '{label}': {reason}")]
    Format { label: String, reason: &'static str },

    /// A caller-supplied argument outside the accepted set (e.g. a comparator).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested column is not part of the dataset schema.
    #[error("Column '{column}' not found in the dataset")]
    ColumnNotFound { column: String },

    /// The dataset file could not be opened or parsed.
    #[error("Failed to load dataset from {}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, StarDustError>;

impl StarDustError {
    pub(crate) fn column_not_found(column: impl Into<String>) -> Self {
        StarDustError::ColumnNotFound {
            column: column.into(),
        }
    }
}
