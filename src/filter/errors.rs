//! Filter compilation errors

use thiserror::Error;

/// Result type for filter compilation
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors raised while compiling a filter model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Primary-key lookup value is not a valid object id
    #[error("invalid primary key '{0}': expected 24 hexadecimal characters")]
    InvalidPrimaryKey(String),

    /// A predicate group contains no predicates
    #[error("query group {0} has no predicates")]
    EmptyGroup(usize),
}

impl FilterError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            FilterError::InvalidPrimaryKey(_) => "FILTER_INVALID_PRIMARY_KEY",
            FilterError::EmptyGroup(_) => "FILTER_EMPTY_GROUP",
        }
    }
}
