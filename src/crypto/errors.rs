//! Cipher error types

use thiserror::Error;

/// Result type for cipher operations
pub type CipherResult<T> = Result<T, CipherError>;

/// Cipher failures, surfaced to callers unchanged
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    #[error("cipher: key size must be 16 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("cipher: ciphertext is too short ({len} bytes, need at least {min})")]
    CiphertextTooShort { len: usize, min: usize },

    #[error("cipher: invalid encoding: {0}")]
    Encoding(String),

    #[error("cipher: encryption failed: {0}")]
    Encryption(String),

    #[error("cipher: decryption failed (wrong key or tampered data)")]
    Decryption,
}

impl CipherError {
    pub fn code(&self) -> &'static str {
        match self {
            CipherError::InvalidKeyLength(_) => "CIPHER_INVALID_KEY_LENGTH",
            CipherError::CiphertextTooShort { .. } => "CIPHER_TEXT_TOO_SHORT",
            CipherError::Encoding(_) => "CIPHER_ENCODING",
            CipherError::Encryption(_) => "CIPHER_ENCRYPTION",
            CipherError::Decryption => "CIPHER_DECRYPTION",
        }
    }
}
