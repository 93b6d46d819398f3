//! Versioned record shapes
//!
//! A shape is the exact field set a record had at a given
//! (document type, version). Checksums are computed against the shape the
//! record declares, so old records stay verifiable after the in-memory
//! type gains fields, as long as their shape stays registered.

use std::collections::HashMap;

/// Document type tag of token records
pub const TOKEN_DOCUMENT_TYPE: &str = "token";

/// Current token shape version
pub const TOKEN_VERSION_001: &str = "001";

/// Fields of `token` version `001`
pub const TOKEN_V001_FIELDS: &[&str] = &[
    "uuid",
    "domainUuid",
    "value",
    "encryptedValue",
    "isDeleted",
    "documentType",
    "version",
    "created",
    "updated",
    "check",
];

/// Field set of one (document type, version)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaShape {
    pub document_type: String,
    pub version: String,
    pub fields: Vec<String>,
}

impl SchemaShape {
    pub fn new(
        document_type: impl Into<String>,
        version: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            document_type: document_type.into(),
            version: version.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Token shape, version 001
    pub fn token_v001() -> Self {
        Self::new(TOKEN_DOCUMENT_TYPE, TOKEN_VERSION_001, TOKEN_V001_FIELDS.iter().copied())
    }

    /// Returns the unique key for this shape (document type, version)
    pub fn key(&self) -> (&str, &str) {
        (&self.document_type, &self.version)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

/// Registered shapes keyed by (document type, version)
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    shapes: HashMap<(String, String), SchemaShape>,
}

impl ShapeRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every shape this crate has shipped
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(SchemaShape::token_v001());
        registry
    }

    /// Registers a shape, replacing any previous shape with the same key
    pub fn register(&mut self, shape: SchemaShape) {
        let key = (shape.document_type.clone(), shape.version.clone());
        self.shapes.insert(key, shape);
    }

    pub fn get(&self, document_type: &str, version: &str) -> Option<&SchemaShape> {
        self.shapes
            .get(&(document_type.to_string(), version.to_string()))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
