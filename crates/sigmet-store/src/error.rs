//! Error types for sigmet-store

use sigmet_core::{DecodeError, SigmetError, SigmetStatus, ValidationError};
use thiserror::Error;

/// Errors that can occur while storing or publishing SIGMETs
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record with this uuid is stored
    #[error("sigmet not found: {0}")]
    NotFound(String),

    /// The stored record is published or cancelled and cannot be replaced
    #[error("sigmet {uuid} is {status} and cannot be modified")]
    Immutable { uuid: String, status: SigmetStatus },

    /// A cancellation or amendment targeted a record that is not published
    #[error("sigmet {uuid} is not published")]
    NotPublished { uuid: String },

    /// The record lacks an identity field needed for numbering
    #[error("sigmet {uuid} has no {field}")]
    MissingIdentity { uuid: String, field: &'static str },

    /// The uuid cannot be used as a file name
    #[error("invalid sigmet uuid: {0:?}")]
    InvalidUuid(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("codec error: {0}")]
    Codec(#[from] SigmetError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DecodeError> for StoreError {
    fn from(err: DecodeError) -> Self {
        StoreError::Codec(SigmetError::Decode(err))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Codec(SigmetError::Serialization(err))
    }
}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immutable_display_names_status() {
        let err = StoreError::Immutable {
            uuid: "abc".to_string(),
            status: SigmetStatus::Published,
        };
        assert_eq!(err.to_string(), "sigmet abc is PUBLISHED and cannot be modified");
    }

    #[test]
    fn test_decode_error_wraps_as_codec() {
        let err: StoreError = DecodeError::MissingField("uuid").into();
        assert!(matches!(err, StoreError::Codec(SigmetError::Decode(_))));
    }
}
