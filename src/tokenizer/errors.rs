//! Token service errors
//!
//! Validation failures are reported to the caller and never retried.
//! Store and cipher errors pass through unchanged.

use thiserror::Error;

use crate::crypto::CipherError;
use crate::datastore::StoreError;

/// Result type for token operations
pub type TokenResult<T> = Result<T, TokenError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("data: domain id and value are required")]
    EmptyValue,

    #[error("data: need domain id")]
    MissingDomainId,

    #[error("data: token domain '{found}' does not match '{expected}'")]
    DomainMismatch { expected: String, found: String },

    #[error("data: need token id")]
    MissingTokenId,

    #[error("data: need uuids")]
    MissingTokenIds,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cipher(#[from] CipherError),
}

impl TokenError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TokenError::EmptyValue
                | TokenError::MissingDomainId
                | TokenError::DomainMismatch { .. }
                | TokenError::MissingTokenId
                | TokenError::MissingTokenIds
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            TokenError::EmptyValue => "TOKEN_EMPTY_VALUE",
            TokenError::MissingDomainId => "TOKEN_MISSING_DOMAIN_ID",
            TokenError::DomainMismatch { .. } => "TOKEN_DOMAIN_MISMATCH",
            TokenError::MissingTokenId => "TOKEN_MISSING_ID",
            TokenError::MissingTokenIds => "TOKEN_MISSING_IDS",
            TokenError::Store(e) => e.code(),
            TokenError::Cipher(e) => e.code(),
        }
    }

    /// HTTP status for the error
    pub fn status_code(&self) -> u16 {
        match self {
            e if e.is_validation() => 400,
            TokenError::Store(StoreError::NotFound) => 404,
            TokenError::Store(StoreError::Query(_)) => 400,
            TokenError::Store(StoreError::Datastore(_)) => 503,
            TokenError::Store(StoreError::Integrity(_)) => 422,
            TokenError::Cipher(_) => 400,
            _ => 500,
        }
    }
}
