//! CLI-specific error types
//!
//! Any CLI error ends the process with a non-zero exit code.

use thiserror::Error;

use crate::config::ConfigError;
use crate::crypto::CipherError;
use crate::datastore::StoreError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("[{code}] {0}", code = .0.code())]
    Config(#[from] ConfigError),

    #[error("[TARPON_CLI_DATASTORE] {0}")]
    Datastore(#[from] StoreError),

    #[error("[TARPON_CLI_ENCRYPTION_KEY] {0}")]
    EncryptionKey(#[from] CipherError),

    #[error("[TARPON_CLI_BOOT_FAILED] {0}")]
    BootFailed(String),
}

impl CliError {
    pub fn boot_failed(msg: impl Into<String>) -> Self {
        CliError::BootFailed(msg.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(e) => e.code(),
            CliError::Datastore(_) => "TARPON_CLI_DATASTORE",
            CliError::EncryptionKey(_) => "TARPON_CLI_ENCRYPTION_KEY",
            CliError::BootFailed(_) => "TARPON_CLI_BOOT_FAILED",
        }
    }
}
