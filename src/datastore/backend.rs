//! Document backend capability
//!
//! The store only needs "execute filter, return matching documents /
//! cursor / write acknowledgement" from a backend. Database and collection
//! are explicit arguments of every call.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::errors::BackendResult;
use crate::filter::{BackendFilter, ObjectId};

/// Acknowledgement of an insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertResult {
    pub inserted_id: ObjectId,
}

/// Acknowledgement of an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Acknowledgement of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// Documents returned by a `find`
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    documents: Vec<Value>,
}

impl Cursor {
    pub fn new(documents: Vec<Value>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn into_documents(self) -> Vec<Value> {
        self.documents
    }

    /// Decodes every document into `T`, failing on the first bad document
    pub fn decode_all<T: DeserializeOwned>(self) -> Result<Vec<T>, serde_json::Error> {
        self.documents
            .into_iter()
            .map(serde_json::from_value)
            .collect()
    }
}

impl IntoIterator for Cursor {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

/// Operations the record store issues against a document database
pub trait DocumentBackend: Send + Sync {
    /// First document matching `filter`, if any
    fn find_one(&self, database: &str, collection: &str, filter: &BackendFilter) -> BackendResult<Option<Value>>;

    /// Matching documents after skipping `skip`; a `limit` of 0 means unbounded
    fn find(
        &self,
        database: &str,
        collection: &str,
        filter: &BackendFilter,
        skip: u64,
        limit: u64,
    ) -> BackendResult<Cursor>;

    /// Inserts `document`, assigning `_id` when absent
    fn insert_one(&self, database: &str, collection: &str, document: Value) -> BackendResult<InsertResult>;

    /// Sets the fields of `set` on the first matching document
    fn update_one(
        &self,
        database: &str,
        collection: &str,
        filter: &BackendFilter,
        set: Value,
    ) -> BackendResult<UpdateResult>;

    fn delete_one(&self, database: &str, collection: &str, filter: &BackendFilter) -> BackendResult<DeleteResult>;

    fn delete_many(&self, database: &str, collection: &str, filter: &BackendFilter) -> BackendResult<DeleteResult>;
}

/// Opens backend connections
pub trait Connector: Send + Sync {
    /// Connects to `uri`, giving up after `timeout`
    fn connect(&self, uri: &str, timeout: Duration) -> BackendResult<Arc<dyn DocumentBackend>>;
}
