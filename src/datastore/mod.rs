//! Data access
//!
//! The record store and the document backend capability it runs against.
//! Backends are reached through [`Connector`]; the crate ships the
//! in-process [`MemoryBackend`].

mod backend;
mod errors;
mod memory;
mod record;
mod store;

pub use backend::{Connector, Cursor, DeleteResult, DocumentBackend, InsertResult, UpdateResult};
pub use errors::{BackendError, BackendResult, StoreError, StoreResult};
pub use memory::{matches, MemoryBackend, MemoryConnector, MEMORY_SCHEME};
pub use record::{Record, RecordMetadata};
pub use store::{clamp_page, RecordStore, StoreConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_RECORDS};
