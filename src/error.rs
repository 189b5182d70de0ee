use thiserror::Error;

/// Convenience result type for encoding operations.
pub type EncodingResult<T> = Result<T, EncodingError>;

/// Error type returned by selection, fitting, transformation and loading.
///
/// Every variant is raised before any output row is produced.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The attribute range expression is malformed or references a column out of bounds.
    #[error("invalid range '{expression}': {message}")]
    InvalidRange { expression: String, message: String },

    /// The target column is neither numeric nor binary nominal.
    #[error("unsupported target: {message}")]
    UnsupportedTarget { message: String },

    /// A dataset passed after fitting does not match the fitted schema.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// The dataset is internally inconsistent (row arity, target index, value kinds).
    #[error("invalid dataset: {message}")]
    InvalidDataSet { message: String },

    /// A stored code table is inconsistent (gaps in category order, non-finite codes).
    #[error("invalid code table: {message}")]
    InvalidCodeTable { message: String },

    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV loading error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Code table (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A CSV cell could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}
