//! Backend-native primary key
//!
//! A 12-byte identifier rendered as 24 lowercase hex digits:
//! 4 bytes of unix seconds, 5 bytes of per-process randomness, and a
//! 3-byte counter. In documents and filters it appears as `{"$oid": "<hex>"}`.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use once_cell::sync::Lazy;
use rand::RngCore;
use serde_json::{json, Value};

use super::errors::{FilterError, FilterResult};

/// Key used for object ids inside JSON documents
pub const OID_KEY: &str = "$oid";

static PROCESS_UNIQUE: Lazy<[u8; 5]> = Lazy::new(|| {
    let mut bytes = [0u8; 5];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
});

static COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(rand::random::<u32>() & 0x00ff_ffff));

/// Primary key assigned by the document backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Generate a fresh id
    pub fn new() -> Self {
        let secs = chrono::Utc::now().timestamp() as u32;
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Parse a 24-character hex string
    pub fn parse_str(input: &str) -> FilterResult<Self> {
        let trimmed = input.trim();
        if trimmed.len() != 24 || !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(FilterError::InvalidPrimaryKey(input.to_string()));
        }

        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&trimmed[i * 2..i * 2 + 2], 16)
                .map_err(|_| FilterError::InvalidPrimaryKey(input.to_string()))?;
        }
        Ok(Self(bytes))
    }

    /// Lowercase hex rendering
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Extended-JSON form used in documents and filters
    pub fn to_value(&self) -> Value {
        json!({ OID_KEY: self.to_hex() })
    }

    /// Read an id back from its extended-JSON form
    pub fn from_value(value: &Value) -> Option<Self> {
        let hex = value.as_object()?.get(OID_KEY)?.as_str()?;
        Self::parse_str(hex).ok()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
