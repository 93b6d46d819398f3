//! In-process document backend
//!
//! Keeps documents per (database, collection) in insertion order and
//! evaluates compiled filters directly. Supports the subset of the filter
//! language the compiler emits: `$and`, `$or`, `$nor`, literal equality
//! (including `{"$oid": ..}` ids), `$eq`, `$ne`, `$in`, `$exists`, and
//! `$regex` with `$options`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use regex::RegexBuilder;
use serde_json::{Map, Value};

use super::backend::{Connector, Cursor, DeleteResult, DocumentBackend, InsertResult, UpdateResult};
use super::errors::{BackendError, BackendResult};
use crate::filter::{BackendFilter, ObjectId, PRIMARY_KEY_FIELD};

/// URI scheme accepted by [`MemoryConnector`]
pub const MEMORY_SCHEME: &str = "memory://";

type Namespace = (String, String);

/// Document backend held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: RwLock<HashMap<Namespace, Vec<Value>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub fn count(&self, database: &str, collection: &str) -> BackendResult<usize> {
        let collections = self.read_lock()?;
        Ok(collections
            .get(&namespace(database, collection))
            .map(Vec::len)
            .unwrap_or(0))
    }

    fn read_lock(&self) -> BackendResult<std::sync::RwLockReadGuard<'_, HashMap<Namespace, Vec<Value>>>> {
        self.collections
            .read()
            .map_err(|e| BackendError::Query(e.to_string()))
    }

    fn write_lock(&self) -> BackendResult<std::sync::RwLockWriteGuard<'_, HashMap<Namespace, Vec<Value>>>> {
        self.collections
            .write()
            .map_err(|e| BackendError::Write(e.to_string()))
    }
}

impl DocumentBackend for MemoryBackend {
    fn find_one(&self, database: &str, collection: &str, filter: &BackendFilter) -> BackendResult<Option<Value>> {
        let collections = self.read_lock()?;
        let Some(documents) = collections.get(&namespace(database, collection)) else {
            return Ok(None);
        };

        for document in documents {
            if matches(document, filter.as_value())? {
                return Ok(Some(document.clone()));
            }
        }
        Ok(None)
    }

    fn find(
        &self,
        database: &str,
        collection: &str,
        filter: &BackendFilter,
        skip: u64,
        limit: u64,
    ) -> BackendResult<Cursor> {
        let collections = self.read_lock()?;
        let Some(documents) = collections.get(&namespace(database, collection)) else {
            return Ok(Cursor::default());
        };

        let limit = if limit == 0 { usize::MAX } else { limit as usize };
        let mut selected = Vec::new();
        let mut skipped = 0u64;
        for document in documents {
            if selected.len() >= limit {
                break;
            }
            if !matches(document, filter.as_value())? {
                continue;
            }
            if skipped < skip {
                skipped += 1;
                continue;
            }
            selected.push(document.clone());
        }
        Ok(Cursor::new(selected))
    }

    fn insert_one(&self, database: &str, collection: &str, mut document: Value) -> BackendResult<InsertResult> {
        let object = document
            .as_object_mut()
            .ok_or_else(|| BackendError::Write("document must be an object".into()))?;

        let id = match object.get(PRIMARY_KEY_FIELD) {
            Some(existing) => ObjectId::from_value(existing)
                .ok_or_else(|| BackendError::Write(format!("unsupported {} value", PRIMARY_KEY_FIELD)))?,
            None => {
                let id = ObjectId::new();
                object.insert(PRIMARY_KEY_FIELD.to_string(), id.to_value());
                id
            }
        };

        let mut collections = self.write_lock()?;
        let documents = collections.entry(namespace(database, collection)).or_default();

        let id_value = id.to_value();
        if documents
            .iter()
            .any(|doc| doc.get(PRIMARY_KEY_FIELD) == Some(&id_value))
        {
            return Err(BackendError::Write(format!("duplicate key {}", id)));
        }

        documents.push(document);
        Ok(InsertResult { inserted_id: id })
    }

    fn update_one(
        &self,
        database: &str,
        collection: &str,
        filter: &BackendFilter,
        set: Value,
    ) -> BackendResult<UpdateResult> {
        let Value::Object(fields) = set else {
            return Err(BackendError::Write("update document must be an object".into()));
        };

        let mut collections = self.write_lock()?;
        let Some(documents) = collections.get_mut(&namespace(database, collection)) else {
            return Ok(UpdateResult::default());
        };

        for document in documents.iter_mut() {
            if !matches(document, filter.as_value())? {
                continue;
            }
            let target = document
                .as_object_mut()
                .ok_or_else(|| BackendError::Write("stored document is not an object".into()))?;
            let modified = apply_set(target, fields)?;
            return Ok(UpdateResult {
                matched_count: 1,
                modified_count: u64::from(modified),
            });
        }
        Ok(UpdateResult::default())
    }

    fn delete_one(&self, database: &str, collection: &str, filter: &BackendFilter) -> BackendResult<DeleteResult> {
        let mut collections = self.write_lock()?;
        let Some(documents) = collections.get_mut(&namespace(database, collection)) else {
            return Ok(DeleteResult::default());
        };

        for index in 0..documents.len() {
            if matches(&documents[index], filter.as_value())? {
                documents.remove(index);
                return Ok(DeleteResult { deleted_count: 1 });
            }
        }
        Ok(DeleteResult::default())
    }

    fn delete_many(&self, database: &str, collection: &str, filter: &BackendFilter) -> BackendResult<DeleteResult> {
        let mut collections = self.write_lock()?;
        let Some(documents) = collections.get_mut(&namespace(database, collection)) else {
            return Ok(DeleteResult::default());
        };

        let doomed = documents
            .iter()
            .map(|document| matches(document, filter.as_value()))
            .collect::<BackendResult<Vec<bool>>>()?;

        let before = documents.len();
        let mut flags = doomed.into_iter();
        documents.retain(|_| !flags.next().unwrap_or(false));
        Ok(DeleteResult {
            deleted_count: (before - documents.len()) as u64,
        })
    }
}

/// Connector handing out a shared [`MemoryBackend`]
#[derive(Debug, Default)]
pub struct MemoryConnector {
    backend: Arc<MemoryBackend>,
    connects: AtomicUsize,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(backend: Arc<MemoryBackend>) -> Self {
        Self {
            backend,
            connects: AtomicUsize::new(0),
        }
    }

    pub fn backend(&self) -> Arc<MemoryBackend> {
        Arc::clone(&self.backend)
    }

    /// Number of successful `connect` calls
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Connector for MemoryConnector {
    // Nothing to wait on in-process, so the timeout never elapses.
    fn connect(&self, uri: &str, _timeout: Duration) -> BackendResult<Arc<dyn DocumentBackend>> {
        if !uri.starts_with(MEMORY_SCHEME) {
            return Err(BackendError::Connection(format!(
                "unsupported datastore uri '{}', expected {}",
                uri, MEMORY_SCHEME
            )));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        let backend: Arc<dyn DocumentBackend> = self.backend.clone();
        Ok(backend)
    }
}

fn namespace(database: &str, collection: &str) -> Namespace {
    (database.to_string(), collection.to_string())
}

fn apply_set(target: &mut Map<String, Value>, fields: Map<String, Value>) -> BackendResult<bool> {
    let mut modified = false;
    for (key, value) in fields {
        if key == PRIMARY_KEY_FIELD {
            if target.get(&key) != Some(&value) {
                return Err(BackendError::Write(format!("{} is immutable", PRIMARY_KEY_FIELD)));
            }
            continue;
        }
        if target.get(&key) != Some(&value) {
            target.insert(key, value);
            modified = true;
        }
    }
    Ok(modified)
}

/// Evaluates a compiled filter against a document
pub fn matches(document: &Value, filter: &Value) -> BackendResult<bool> {
    let conditions = filter
        .as_object()
        .ok_or_else(|| BackendError::Query("filter must be an object".into()))?;

    for (key, condition) in conditions {
        let matched = match key.as_str() {
            "$and" => {
                let mut all = true;
                for clause in clauses(key, condition)? {
                    if !matches(document, clause)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for clause in clauses(key, condition)? {
                    if matches(document, clause)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            "$nor" => {
                let mut none = true;
                for clause in clauses(key, condition)? {
                    if matches(document, clause)? {
                        none = false;
                        break;
                    }
                }
                none
            }
            op if op.starts_with('$') => {
                return Err(BackendError::Query(format!("unsupported operator '{}'", op)));
            }
            field => matches_field(document.get(field), condition)?,
        };

        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn clauses<'a>(key: &str, condition: &'a Value) -> BackendResult<&'a Vec<Value>> {
    match condition.as_array() {
        Some(items) if !items.is_empty() => Ok(items),
        _ => Err(BackendError::Query(format!("{} requires a non-empty array", key))),
    }
}

fn is_operator_object(condition: &Map<String, Value>) -> bool {
    !condition.is_empty()
        && condition
            .keys()
            .all(|k| k.starts_with('$') && k != crate::filter::OID_KEY)
}

fn matches_field(actual: Option<&Value>, condition: &Value) -> BackendResult<bool> {
    let operators = match condition {
        Value::Object(map) if is_operator_object(map) => map,
        literal => return Ok(actual == Some(literal)),
    };

    for (op, argument) in operators {
        let matched = match op.as_str() {
            "$eq" => actual == Some(argument),
            "$ne" => actual != Some(argument),
            "$in" => {
                let candidates = argument
                    .as_array()
                    .ok_or_else(|| BackendError::Query("$in requires an array".into()))?;
                actual.map(|v| candidates.contains(v)).unwrap_or(false)
            }
            "$exists" => actual.is_some() == argument.as_bool().unwrap_or(true),
            "$regex" => {
                let options = operators.get("$options").and_then(Value::as_str).unwrap_or("");
                matches_regex(actual, argument, options)?
            }
            "$options" => {
                if !operators.contains_key("$regex") {
                    return Err(BackendError::Query("$options without $regex".into()));
                }
                true
            }
            other => {
                return Err(BackendError::Query(format!("unsupported operator '{}'", other)));
            }
        };

        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches_regex(actual: Option<&Value>, pattern: &Value, options: &str) -> BackendResult<bool> {
    let pattern = pattern
        .as_str()
        .ok_or_else(|| BackendError::Query("$regex requires a string".into()))?;

    let mut builder = RegexBuilder::new(pattern);
    for flag in options.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            other => {
                return Err(BackendError::Query(format!("unsupported regex option '{}'", other)));
            }
        };
    }
    let regex = builder
        .build()
        .map_err(|e| BackendError::Query(format!("invalid regex: {}", e)))?;

    Ok(actual
        .and_then(Value::as_str)
        .map(|s| regex.is_match(s))
        .unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DB: &str = "test";
    const COLL: &str = "community";

    fn filter(value: Value) -> BackendFilter {
        BackendFilter::from_value(value)
    }

    fn seeded() -> MemoryBackend {
        let backend = MemoryBackend::new();
        for (uuid, domain, deleted) in [("a", "d1", false), ("b", "d1", true), ("c", "d2", false)] {
            backend
                .insert_one(DB, COLL, json!({"uuid": uuid, "domainUuid": domain, "isDeleted": deleted}))
                .unwrap();
        }
        backend
    }

    #[test]
    fn test_insert_assigns_object_id() {
        let backend = MemoryBackend::new();
        let result = backend.insert_one(DB, COLL, json!({"uuid": "a"})).unwrap();

        let found = backend
            .find_one(DB, COLL, &BackendFilter::primary_key(&result.inserted_id))
            .unwrap()
            .unwrap();
        assert_eq!(found["uuid"], "a");
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let backend = MemoryBackend::new();
        let id = ObjectId::new();
        backend.insert_one(DB, COLL, json!({"_id": id.to_value()})).unwrap();
        assert!(matches!(
            backend.insert_one(DB, COLL, json!({"_id": id.to_value()})),
            Err(BackendError::Write(_))
        ));
    }

    #[test]
    fn test_logical_operators() {
        let backend = seeded();
        let cursor = backend
            .find(
                DB,
                COLL,
                &filter(json!({"$and": [
                    {"domainUuid": "d1"},
                    {"$or": [{"uuid": "a"}, {"uuid": "b"}]},
                    {"isDeleted": false}
                ]})),
                0,
                0,
            )
            .unwrap();
        let docs = cursor.into_documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["uuid"], "a");
    }

    #[test]
    fn test_regex_and_ne() {
        let backend = seeded();
        let ci = filter(json!({"domainUuid": {"$regex": "^D1$", "$options": "i"}}));
        assert_eq!(backend.find(DB, COLL, &ci, 0, 0).unwrap().len(), 2);

        let cs = filter(json!({"domainUuid": {"$regex": "^D1$"}}));
        assert_eq!(backend.find(DB, COLL, &cs, 0, 0).unwrap().len(), 0);

        let ne = filter(json!({"domainUuid": {"$ne": "d1"}}));
        assert_eq!(backend.find(DB, COLL, &ne, 0, 0).unwrap().len(), 1);
    }

    #[test]
    fn test_skip_and_limit() {
        let backend = seeded();
        let all = BackendFilter::match_all();
        let docs = backend.find(DB, COLL, &all, 1, 1).unwrap().into_documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["uuid"], "b");
    }

    #[test]
    fn test_update_sets_fields_on_first_match() {
        let backend = seeded();
        let result = backend
            .update_one(DB, COLL, &filter(json!({"domainUuid": "d1"})), json!({"isDeleted": true}))
            .unwrap();
        assert_eq!(result, UpdateResult { matched_count: 1, modified_count: 1 });

        let a = backend.find_one(DB, COLL, &filter(json!({"uuid": "a"}))).unwrap().unwrap();
        assert_eq!(a["isDeleted"], true);
        assert_eq!(a["domainUuid"], "d1");
    }

    #[test]
    fn test_delete_one_and_many() {
        let backend = seeded();
        let one = backend.delete_one(DB, COLL, &filter(json!({"domainUuid": "d1"}))).unwrap();
        assert_eq!(one.deleted_count, 1);

        let many = backend.delete_many(DB, COLL, &BackendFilter::match_all()).unwrap();
        assert_eq!(many.deleted_count, 2);
        assert_eq!(backend.count(DB, COLL).unwrap(), 0);
    }

    #[test]
    fn test_unknown_operator_is_a_query_error() {
        let backend = seeded();
        let bad = filter(json!({"uuid": {"$where": "1"}}));
        assert!(matches!(backend.find(DB, COLL, &bad, 0, 0), Err(BackendError::Query(_))));
    }

    #[test]
    fn test_connector_rejects_foreign_scheme() {
        let connector = MemoryConnector::new();
        assert!(connector
            .connect("mongodb://localhost:27017", Duration::from_secs(1))
            .is_err());
        assert!(connector.connect("memory://", Duration::from_secs(1)).is_ok());
        assert_eq!(connector.connect_count(), 1);
    }
}
