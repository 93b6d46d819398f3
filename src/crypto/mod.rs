//! Symmetric encryption of token values

mod cipher;
mod errors;

pub use cipher::{check_key, AesGcmCipher, ValueCipher, KEY_SIZES, NONCE_SIZE, TAG_SIZE};
pub use errors::{CipherError, CipherResult};
