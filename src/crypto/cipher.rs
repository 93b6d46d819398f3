//! Value encryption using AES-GCM.
//!
//! Every message gets a fresh random nonce, prepended to the sealed bytes
//! and base64-encoded for storage: `base64(nonce || ciphertext || tag)`.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes128Gcm, Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;

use super::errors::{CipherError, CipherResult};

/// Size of nonce in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Accepted key lengths in bytes (AES-128, AES-256).
pub const KEY_SIZES: [usize; 2] = [16, 32];

/// Symmetric cipher over string values
pub trait ValueCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str, key: &[u8]) -> CipherResult<String>;

    fn decrypt(&self, ciphertext: &str, key: &[u8]) -> CipherResult<String>;
}

/// AES-GCM with the key size picked from the key length
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmCipher;

impl AesGcmCipher {
    pub fn new() -> Self {
        Self
    }
}

/// Checks that `key` is usable by [`AesGcmCipher`].
pub fn check_key(key: &[u8]) -> CipherResult<()> {
    if KEY_SIZES.contains(&key.len()) {
        Ok(())
    } else {
        Err(CipherError::InvalidKeyLength(key.len()))
    }
}

fn seal(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> CipherResult<Vec<u8>> {
    let nonce = Nonce::from_slice(nonce);
    let sealed = match key.len() {
        16 => Aes128Gcm::new_from_slice(key)
            .map_err(|_| CipherError::InvalidKeyLength(key.len()))?
            .encrypt(nonce, plaintext),
        32 => Aes256Gcm::new_from_slice(key)
            .map_err(|_| CipherError::InvalidKeyLength(key.len()))?
            .encrypt(nonce, plaintext),
        other => return Err(CipherError::InvalidKeyLength(other)),
    };
    sealed.map_err(|e| CipherError::Encryption(e.to_string()))
}

fn open(key: &[u8], nonce: &[u8], sealed: &[u8]) -> CipherResult<Vec<u8>> {
    let nonce = Nonce::from_slice(nonce);
    let opened = match key.len() {
        16 => Aes128Gcm::new_from_slice(key)
            .map_err(|_| CipherError::InvalidKeyLength(key.len()))?
            .decrypt(nonce, sealed),
        32 => Aes256Gcm::new_from_slice(key)
            .map_err(|_| CipherError::InvalidKeyLength(key.len()))?
            .decrypt(nonce, sealed),
        other => return Err(CipherError::InvalidKeyLength(other)),
    };
    opened.map_err(|_| CipherError::Decryption)
}

impl ValueCipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &str, key: &[u8]) -> CipherResult<String> {
        check_key(key)?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let sealed = seal(key, &nonce_bytes, plaintext.as_bytes())?;

        let mut bytes = Vec::with_capacity(NONCE_SIZE + sealed.len());
        bytes.extend_from_slice(&nonce_bytes);
        bytes.extend_from_slice(&sealed);
        Ok(STANDARD.encode(&bytes))
    }

    fn decrypt(&self, ciphertext: &str, key: &[u8]) -> CipherResult<String> {
        check_key(key)?;

        let bytes = STANDARD
            .decode(ciphertext)
            .map_err(|e| CipherError::Encoding(format!("invalid base64: {}", e)))?;

        let min = NONCE_SIZE + TAG_SIZE;
        if bytes.len() < min {
            return Err(CipherError::CiphertextTooShort {
                len: bytes.len(),
                min,
            });
        }

        let (nonce_bytes, sealed) = bytes.split_at(NONCE_SIZE);
        let plaintext = open(key, nonce_bytes, sealed)?;
        String::from_utf8(plaintext).map_err(|e| CipherError::Encoding(format!("invalid UTF-8: {}", e)))
    }
}
