//! Observability subsystem for tarpon
//!
//! Structured logging through `tracing`. Call sites attach an `event`
//! field from [`Event`]:
//!
//! ```ignore
//! use tarpon::observability::Event;
//!
//! tracing::info!(event = Event::TokenCreated.as_str(), domain = %domain, "token created");
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{env_filter, init_logging, LogFormat};

use thiserror::Error;

/// Observability failures
///
/// Never fatal to the service; callers report and continue.
#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("failed to install log subscriber: {0}")]
    Subscriber(String),
}

impl ObservabilityError {
    pub fn code(&self) -> &'static str {
        "OBSERVABILITY_FAILED"
    }
}

/// Result type for observability operations
pub type ObservabilityResult<T> = Result<T, ObservabilityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observability_error_display() {
        let err = ObservabilityError::Subscriber("already set".into());
        assert!(err.to_string().contains("already set"));
        assert_eq!(err.code(), "OBSERVABILITY_FAILED");
    }
}
