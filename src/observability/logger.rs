//! Log subscriber setup
//!
//! One log line = one event. Production mode writes JSON lines; any other
//! mode writes the compact human format. `RUST_LOG` overrides the
//! configured level when set.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::ObservabilityError;

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

impl LogFormat {
    /// JSON in production, compact otherwise
    pub fn for_api_mode(api_mode: &str) -> Self {
        if api_mode.eq_ignore_ascii_case("production") {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

/// Builds the filter from `RUST_LOG`, falling back to `default_level`
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tarpon={0},tower_http={0},warn", default_level)))
}

/// Installs the global subscriber
///
/// Fails if a global subscriber is already set.
pub fn init_logging(default_level: &str, format: LogFormat) -> Result<(), ObservabilityError> {
    let filter = env_filter(default_level);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact().with_target(false))
            .try_init(),
    };

    installed.map_err(|e| ObservabilityError::Subscriber(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_for_api_mode() {
        assert_eq!(LogFormat::for_api_mode("production"), LogFormat::Json);
        assert_eq!(LogFormat::for_api_mode("PRODUCTION"), LogFormat::Json);
        assert_eq!(LogFormat::for_api_mode("development"), LogFormat::Compact);
        assert_eq!(LogFormat::for_api_mode(""), LogFormat::Compact);
    }

    #[test]
    fn test_second_init_fails() {
        // Whichever call wins, the other must report an error rather than panic.
        let first = init_logging("info", LogFormat::Compact);
        let second = init_logging("info", LogFormat::Json);
        assert!(first.is_err() || second.is_err());
    }
}
