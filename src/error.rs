/// Error types for the fallible tablepipe surfaces
///
/// Engine operations never fail; only loading records and configuration
/// from external JSON can.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object for a record")]
    NotAnObject,

    #[error("expected a JSON array of records")]
    NotAnArray,

    #[error("unsupported value in field '{field}': {reason}")]
    UnsupportedValue { field: String, reason: String },
}
