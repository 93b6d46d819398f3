//! Token record and batch shapes

use serde::{Deserialize, Serialize};

use crate::datastore::{Record, RecordMetadata};
use crate::integrity::{TOKEN_DOCUMENT_TYPE, TOKEN_VERSION_001};

/// Persisted token
///
/// `uuid` and `domain_uuid` never change after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub uuid: String,
    pub domain_uuid: String,
    pub value: String,
    #[serde(default)]
    pub encrypted_value: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(flatten)]
    pub meta: RecordMetadata,
}

impl Token {
    pub fn new(uuid: impl Into<String>, domain_uuid: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            domain_uuid: domain_uuid.into(),
            value: value.into(),
            ..Default::default()
        }
    }
}

impl Record for Token {
    const DOCUMENT_TYPE: &'static str = TOKEN_DOCUMENT_TYPE;
    const VERSION: &'static str = TOKEN_VERSION_001;
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["uuid", "domainUuid"];

    fn record_id(&self) -> &str {
        &self.uuid
    }

    fn metadata(&self) -> &RecordMetadata {
        &self.meta
    }

    fn metadata_mut(&mut self) -> &mut RecordMetadata {
        &mut self.meta
    }
}

/// Batch-create input item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewToken {
    pub domain_uuid: String,
    pub value: String,
}

impl NewToken {
    pub fn new(domain_uuid: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            domain_uuid: domain_uuid.into(),
            value: value.into(),
        }
    }
}

/// A rejected batch item, tagged with the input that caused it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenFailure {
    pub token: NewToken,
    pub code: String,
    pub error: String,
}

/// Result of a batch create: partial success is representable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub created: Vec<Token>,
    pub errors: Vec<TokenFailure>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Batch lookup of token values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenQuery {
    /// Optional; must match the addressed domain when given
    pub domain_uuid: String,
    pub uuids: Vec<String>,
}
