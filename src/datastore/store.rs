//! Generic record store
//!
//! CRUD primitives over any [`Record`] type. The store compiles filter
//! groups, runs them against the backend and decodes the results into
//! the caller's type. Every write recomputes the record checksum.
//!
//! The backend handle is opened by the first operation that needs it and
//! shared afterwards. Concurrent first callers wait on the same
//! initialization instead of each opening a connection.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::backend::{Connector, DocumentBackend};
use super::errors::{StoreError, StoreResult};
use super::record::Record;
use crate::filter::{
    self, BackendFilter, DataQuery, DataQueryGroup, LogicalOperator, ObjectId, PRIMARY_KEY_FIELD,
};
use crate::integrity::{Integrity, CHECKSUM_FIELD, RECORD_ID_FIELD};
use crate::observability::Event;

/// Default hard cap on records returned by one `get_many`
pub const DEFAULT_MAX_RECORDS: u64 = 100;

/// Persisted creation timestamp, preserved across updates
const CREATED_FIELD: &str = "created";

/// Default deadline for opening the backend connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection and paging settings for a [`RecordStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub uri: String,
    pub database: String,
    /// Hard cap on page size
    pub max_records: u64,
    pub connect_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: "memory://".to_string(),
            database: "tarpon".to_string(),
            max_records: DEFAULT_MAX_RECORDS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Clamps caller paging to `start >= 0` and `1 <= limit <= max_records`
///
/// A non-positive limit asks for a full page.
pub fn clamp_page(start: i64, limit: i64, max_records: u64) -> (u64, u64) {
    let start = start.max(0) as u64;
    let limit = if limit <= 0 {
        max_records
    } else {
        (limit as u64).min(max_records)
    };
    (start, limit)
}

/// Record store over a document backend
pub struct RecordStore {
    config: StoreConfig,
    connector: Arc<dyn Connector>,
    integrity: Integrity,
    backend: OnceCell<Arc<dyn DocumentBackend>>,
}

impl RecordStore {
    pub fn new(config: StoreConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            integrity: Integrity::with_defaults(),
            backend: OnceCell::new(),
        }
    }

    /// Replaces the shape registry used for checksums
    pub fn with_integrity(mut self, integrity: Integrity) -> Self {
        self.integrity = integrity;
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn integrity(&self) -> &Integrity {
        &self.integrity
    }

    /// Returns the shared backend handle, opening it on first use
    pub fn connect(&self) -> StoreResult<Arc<dyn DocumentBackend>> {
        let backend = self.backend.get_or_try_init(|| {
            match self
                .connector
                .connect(&self.config.uri, self.config.connect_timeout)
            {
                Ok(backend) => {
                    info!(
                        event = Event::DatastoreConnected.as_str(),
                        database = %self.config.database,
                        "datastore connected"
                    );
                    Ok(backend)
                }
                Err(e) => {
                    error!(
                        event = Event::DatastoreConnectFailed.as_str(),
                        error = %e,
                        "datastore connection failed"
                    );
                    Err(StoreError::datastore(e.to_string()))
                }
            }
        })?;
        Ok(Arc::clone(backend))
    }

    /// First record matching the filter
    pub fn get_one<T: DeserializeOwned>(
        &self,
        collection: &str,
        groups: &[DataQueryGroup],
        operator: LogicalOperator,
    ) -> StoreResult<T> {
        let backend = self.connect()?;
        let filter = self.compile(groups, operator)?;

        let document = backend
            .find_one(&self.config.database, collection, &filter)
            .map_err(|e| self.rejected(collection, e.into()))?
            .ok_or(StoreError::NotFound)?;

        debug!(event = Event::QueryExecuted.as_str(), collection, "get_one");
        decode(document)
    }

    /// One page of matching records
    ///
    /// `limit` never exceeds the configured `max_records`.
    pub fn get_many<T: DeserializeOwned>(
        &self,
        collection: &str,
        groups: &[DataQueryGroup],
        operator: LogicalOperator,
        start: i64,
        limit: i64,
    ) -> StoreResult<Vec<T>> {
        let backend = self.connect()?;
        let filter = self.compile(groups, operator)?;
        let (skip, limit) = clamp_page(start, limit, self.config.max_records);

        let cursor = backend
            .find(&self.config.database, collection, &filter, skip, limit)
            .map_err(|e| self.rejected(collection, e.into()))?;

        debug!(
            event = Event::QueryExecuted.as_str(),
            collection,
            skip,
            limit,
            returned = cursor.len(),
            "get_many"
        );
        cursor
            .decode_all()
            .map_err(|e| StoreError::query(format!("decode failed: {}", e)))
    }

    /// Writes a new record and returns it as stored
    ///
    /// The record is re-read by the backend's primary key so that fields
    /// the backend materializes are part of the result.
    pub fn insert<T: Record>(&self, collection: &str, mut record: T) -> StoreResult<T> {
        let backend = self.connect()?;
        record.stamp(now());
        let document = self.seal(&mut record)?;

        let inserted = backend
            .insert_one(&self.config.database, collection, document)
            .map_err(|e| self.rejected(collection, e.into()))?;

        let stored = backend
            .find_one(
                &self.config.database,
                collection,
                &BackendFilter::primary_key(&inserted.inserted_id),
            )?
            .ok_or_else(|| {
                StoreError::query(format!(
                    "inserted record {} could not be read back",
                    inserted.inserted_id
                ))
            })?;

        info!(
            event = Event::RecordInserted.as_str(),
            collection,
            id = record.record_id(),
            "record inserted"
        );
        decode(stored)
    }

    /// Sets the record's fields on the first matching document
    ///
    /// Fails with `NotFound` when nothing matches, and with `Query` when the
    /// record would change one of `T::IMMUTABLE_FIELDS`. The stored
    /// `created` timestamp is kept whatever the record carries.
    pub fn update<T: Record>(
        &self,
        collection: &str,
        groups: &[DataQueryGroup],
        operator: LogicalOperator,
        mut record: T,
    ) -> StoreResult<T> {
        let backend = self.connect()?;
        let filter = self.compile(groups, operator)?;

        let stored = backend
            .find_one(&self.config.database, collection, &filter)
            .map_err(|e| self.rejected(collection, e.into()))?
            .ok_or(StoreError::NotFound)?;
        let stored_id = stored
            .get(PRIMARY_KEY_FIELD)
            .and_then(ObjectId::from_value)
            .ok_or_else(|| StoreError::query(format!("stored record has no {}", PRIMARY_KEY_FIELD)))?;

        record.metadata_mut().created = stored.get(CREATED_FIELD).and_then(Value::as_i64).unwrap_or(0);
        record.stamp(now());
        let mut document = self.seal(&mut record)?;
        reject_identity_change::<T>(&stored, &document)
            .map_err(|e| self.rejected(collection, e))?;
        if let Some(fields) = document.as_object_mut() {
            fields.remove(PRIMARY_KEY_FIELD);
        }

        let result = backend
            .update_one(
                &self.config.database,
                collection,
                &BackendFilter::primary_key(&stored_id),
                document,
            )
            .map_err(|e| self.rejected(collection, e.into()))?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound);
        }

        info!(
            event = Event::RecordUpdated.as_str(),
            collection,
            id = record.record_id(),
            modified = result.modified_count,
            "record updated"
        );
        Ok(record)
    }

    /// Physically removes the record with the given id
    pub fn delete_one(&self, collection: &str, id: &str) -> StoreResult<u64> {
        let backend = self.connect()?;
        let filter = self.compile(&[by_record_id(id)], LogicalOperator::And)?;

        let result = backend
            .delete_one(&self.config.database, collection, &filter)
            .map_err(|e| self.rejected(collection, e.into()))?;

        info!(
            event = Event::RecordsDeleted.as_str(),
            collection,
            deleted = result.deleted_count,
            "delete_one"
        );
        Ok(result.deleted_count)
    }

    /// Physically removes every matching record
    pub fn delete_many(
        &self,
        collection: &str,
        groups: &[DataQueryGroup],
        operator: LogicalOperator,
    ) -> StoreResult<u64> {
        let backend = self.connect()?;
        let filter = self.compile(groups, operator)?;

        let result = backend
            .delete_many(&self.config.database, collection, &filter)
            .map_err(|e| self.rejected(collection, e.into()))?;

        info!(
            event = Event::RecordsDeleted.as_str(),
            collection,
            deleted = result.deleted_count,
            "delete_many"
        );
        Ok(result.deleted_count)
    }

    /// Loads a record by id and checks its stored checksum
    pub fn validate_checksum(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let backend = self.connect()?;
        let filter = self.compile(&[by_record_id(id)], LogicalOperator::And)?;

        let document = backend
            .find_one(&self.config.database, collection, &filter)
            .map_err(|e| self.rejected(collection, e.into()))?
            .ok_or(StoreError::NotFound)?;

        let ok = self.integrity.validate(&document)?;
        if ok {
            debug!(event = Event::ChecksumVerified.as_str(), collection, id, "checksum ok");
        } else {
            warn!(event = Event::ChecksumMismatch.as_str(), collection, id, "checksum mismatch");
        }
        Ok(ok)
    }

    fn compile(&self, groups: &[DataQueryGroup], operator: LogicalOperator) -> StoreResult<BackendFilter> {
        filter::compile(groups, operator).map_err(|e| {
            warn!(event = Event::QueryRejected.as_str(), error = %e, "filter rejected");
            StoreError::from(e)
        })
    }

    /// Computes the checksum, storing it on both the record and its document
    fn seal<T: Record>(&self, record: &mut T) -> StoreResult<Value> {
        let mut document = serde_json::to_value(&*record)
            .map_err(|e| StoreError::query(format!("encode failed: {}", e)))?;
        let checksum = self.integrity.checksum_for(&document)?;
        document[CHECKSUM_FIELD] = Value::String(checksum.clone());
        record.metadata_mut().check = checksum;
        Ok(document)
    }

    fn rejected(&self, collection: &str, err: StoreError) -> StoreError {
        warn!(
            event = Event::QueryRejected.as_str(),
            collection,
            code = err.code(),
            error = %err,
            "backend rejected operation"
        );
        err
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("config", &self.config)
            .field("connected", &self.backend.get().is_some())
            .finish()
    }
}

fn by_record_id(id: &str) -> DataQueryGroup {
    DataQueryGroup::single(DataQuery::exact(RECORD_ID_FIELD, id))
}

fn reject_identity_change<T: Record>(stored: &Value, document: &Value) -> StoreResult<()> {
    for field in T::IMMUTABLE_FIELDS {
        let before = stored.get(*field).unwrap_or(&Value::Null);
        let after = document.get(*field).unwrap_or(&Value::Null);
        if before != after {
            return Err(StoreError::query(format!(
                "field '{}' is immutable: {} -> {}",
                field, before, after
            )));
        }
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(document: Value) -> StoreResult<T> {
    serde_json::from_value(document).map_err(|e| StoreError::query(format!("decode failed: {}", e)))
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_page_caps_limit() {
        assert_eq!(clamp_page(0, 10_000, 100), (0, 100));
        assert_eq!(clamp_page(5, 20, 100), (5, 20));
    }

    #[test]
    fn test_clamp_page_negative_start() {
        assert_eq!(clamp_page(-3, 10, 100), (0, 10));
    }

    #[test]
    fn test_clamp_page_non_positive_limit_is_full_page() {
        assert_eq!(clamp_page(0, 0, 100), (0, 100));
        assert_eq!(clamp_page(0, -1, 25), (0, 25));
    }

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.max_records, 100);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert!(config.uri.starts_with("memory://"));
    }
}
