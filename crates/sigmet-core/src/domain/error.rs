//! Domain-level error taxonomy for SIGMET records.

use super::geometry::GeometryError;

/// Errors produced by lifecycle validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field: {field}")]
    MissingRequiredField { field: &'static str },

    #[error("unrecognized {field} code: {code}")]
    UnrecognizedCode { field: &'static str, code: String },

    #[error("invalid cancellation target: {reason}")]
    InvalidCancellationTarget { reason: String },
}

impl ValidationError {
    pub(crate) fn cancellation(reason: impl Into<String>) -> Self {
        ValidationError::InvalidCancellationTarget {
            reason: reason.into(),
        }
    }
}

/// Errors produced while decoding canonical JSON into a record.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid geojson: {0}")]
    Geometry(#[from] GeometryError),

    #[error("unparseable timestamp in {field}: {value:?}")]
    Timestamp { field: &'static str, value: String },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("unknown field: {0}")]
    UnknownField(String),
}

/// SIGMET domain errors.
#[derive(Debug, thiserror::Error)]
pub enum SigmetError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for SIGMET domain operations.
pub type Result<T> = std::result::Result<T, SigmetError>;
