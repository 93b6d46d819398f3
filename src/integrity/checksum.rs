//! SHA-256 content digests for record integrity
//!
//! The same input always produces the same digest; digests are rendered as
//! lowercase hex.

use sha2::{Digest, Sha256};

/// Hashes `data` and returns the lowercase hex digest
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Verifies that `data` hashes to `expected`
pub fn verify_digest(data: &[u8], expected: &str) -> bool {
    hash_bytes(data) == expected
}
