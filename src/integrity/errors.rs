//! Integrity validation errors

use thiserror::Error;

/// Result type for integrity operations
pub type IntegrityResult<T> = Result<T, IntegrityError>;

/// Preconditions for checksum validation that a record can fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// Record lacks a document type or version tag
    #[error("record '{record_id}' is missing document type or version")]
    MissingSchemaInfo { record_id: String },

    /// No shape is registered for the record's document type and version
    #[error("no schema shape for document type '{document_type}' version '{version}'")]
    UnknownSchemaVersion {
        document_type: String,
        version: String,
    },

    /// Record could not be serialized for hashing
    #[error("record is not a JSON object")]
    NotAnObject,
}

impl IntegrityError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            IntegrityError::MissingSchemaInfo { .. } => "INTEGRITY_MISSING_SCHEMA_INFO",
            IntegrityError::UnknownSchemaVersion { .. } => "INTEGRITY_UNKNOWN_SCHEMA_VERSION",
            IntegrityError::NotAnObject => "INTEGRITY_NOT_AN_OBJECT",
        }
    }
}
