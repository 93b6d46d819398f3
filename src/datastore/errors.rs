//! Datastore error types
//!
//! Backend failures are remapped into the store taxonomy and returned,
//! never swallowed:
//! - NotFound: no matching record
//! - Query: malformed filter, backend query/write failure, decode failure
//! - Datastore: connection or setup failure
//! - Integrity: checksum validation preconditions

use thiserror::Error;

use crate::filter::FilterError;
use crate::integrity::IntegrityError;

/// Result type for record store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for document backend calls
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors reported by a document backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Could not establish or use the connection
    #[error("connection failed: {0}")]
    Connection(String),

    /// Filter rejected or query failed
    #[error("query failed: {0}")]
    Query(String),

    /// Write rejected
    #[error("write failed: {0}")]
    Write(String),
}

/// Record store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record matched
    #[error("data: record not found")]
    NotFound,

    /// Query returned an error and may be malformed
    #[error("data: query error: {0}")]
    Query(String),

    /// Datastore connection or setup failure
    #[error("data: datastore error: {0}")]
    Datastore(String),

    /// Integrity validation precondition failed
    #[error("data: {0}")]
    Integrity(#[from] IntegrityError),
}

impl StoreError {
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn datastore(msg: impl Into<String>) -> Self {
        Self::Datastore(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound => "DATA_NOT_FOUND",
            StoreError::Query(_) => "DATA_QUERY_ERROR",
            StoreError::Datastore(_) => "DATA_DATASTORE_ERROR",
            StoreError::Integrity(e) => e.code(),
        }
    }
}

impl From<FilterError> for StoreError {
    fn from(e: FilterError) -> Self {
        StoreError::Query(e.to_string())
    }
}

impl From<BackendError> for StoreError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Connection(msg) => StoreError::Datastore(msg),
            BackendError::Query(msg) | BackendError::Write(msg) => StoreError::Query(msg),
        }
    }
}
