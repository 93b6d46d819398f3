//! Record integrity
//!
//! Versioned content checksums. Every record declares a document type and
//! a shape version; its checksum is computed over exactly the fields of
//! that shape, so validation keeps working after the record type evolves.

pub mod checksum;
mod errors;
mod shape;
mod validator;

pub use checksum::{hash_bytes, verify_digest};
pub use errors::{IntegrityError, IntegrityResult};
pub use shape::{SchemaShape, ShapeRegistry, TOKEN_DOCUMENT_TYPE, TOKEN_V001_FIELDS, TOKEN_VERSION_001};
pub use validator::{
    Integrity, CHECKSUM_FIELD, DOCUMENT_TYPE_FIELD, RECORD_ID_FIELD, VERSION_FIELD,
};
