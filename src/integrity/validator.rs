//! Record checksum computation and validation
//!
//! A checksum is the digest of the record projected onto its declared
//! shape, with the checksum field forced to the empty string.

use serde_json::{Map, Value};

use super::checksum::hash_bytes;
use super::errors::{IntegrityError, IntegrityResult};
use super::shape::{SchemaShape, ShapeRegistry};

/// Field holding a record's document type tag
pub const DOCUMENT_TYPE_FIELD: &str = "documentType";

/// Field holding a record's shape version
pub const VERSION_FIELD: &str = "version";

/// Field holding a record's checksum
pub const CHECKSUM_FIELD: &str = "check";

/// Field holding a record's opaque id
pub const RECORD_ID_FIELD: &str = "uuid";

/// Computes and validates versioned record checksums
#[derive(Debug, Clone)]
pub struct Integrity {
    registry: ShapeRegistry,
}

impl Integrity {
    pub fn new(registry: ShapeRegistry) -> Self {
        Self { registry }
    }

    pub fn with_defaults() -> Self {
        Self::new(ShapeRegistry::with_defaults())
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    /// Digest of `record` projected onto `shape`
    ///
    /// Fields the record lacks project as `null`; fields outside the shape
    /// (including the backend `_id`) are ignored.
    pub fn compute_checksum(record: &Value, shape: &SchemaShape) -> IntegrityResult<String> {
        let object = record.as_object().ok_or(IntegrityError::NotAnObject)?;

        let mut projected = Map::new();
        for field in &shape.fields {
            let value = if field == CHECKSUM_FIELD {
                Value::String(String::new())
            } else {
                object.get(field).cloned().unwrap_or(Value::Null)
            };
            projected.insert(field.clone(), value);
        }

        Ok(hash_bytes(Value::Object(projected).to_string().as_bytes()))
    }

    /// Digest of `record` using the shape it declares
    pub fn checksum_for(&self, record: &Value) -> IntegrityResult<String> {
        let shape = self.resolve_shape(record)?;
        Self::compute_checksum(record, shape)
    }

    /// Recomputes the checksum and compares it with the stored one
    pub fn validate(&self, record: &Value) -> IntegrityResult<bool> {
        let expected = self.checksum_for(record)?;
        let stored = record
            .get(CHECKSUM_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default();
        Ok(expected.as_bytes() == stored.as_bytes())
    }

    fn resolve_shape(&self, record: &Value) -> IntegrityResult<&SchemaShape> {
        let object = record.as_object().ok_or(IntegrityError::NotAnObject)?;
        let tag = |field: &str| {
            object
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let document_type = tag(DOCUMENT_TYPE_FIELD);
        let version = tag(VERSION_FIELD);
        if document_type.is_empty() || version.is_empty() {
            return Err(IntegrityError::MissingSchemaInfo {
                record_id: tag(RECORD_ID_FIELD),
            });
        }

        self.registry
            .get(&document_type, &version)
            .ok_or(IntegrityError::UnknownSchemaVersion {
                document_type,
                version,
            })
    }
}

impl Default for Integrity {
    fn default() -> Self {
        Self::with_defaults()
    }
}
