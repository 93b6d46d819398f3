//! Filter compiler
//!
//! Translates the filter model into the document backend's native filter
//! language (Mongo-shaped JSON). Compilation is pure: no I/O, and the
//! model is only borrowed.
//!
//! Per-predicate precedence, first match wins:
//! 1. primary key present  -> `{"_id": {"$oid": ..}}`
//! 2. boolean flag         -> `{field: bool}`
//! 3. wildcard             -> `{field: {"$regex": pattern[, "$options": "i"]}}`
//! 4. exact value          -> `{field: value}`, `{field: {"$ne": value}}`,
//!    or `{field: {"$regex": "^value$", "$options": "i"}}`

use serde_json::{json, Map, Value};

use super::errors::{FilterError, FilterResult};
use super::model::{DataQuery, DataQueryGroup, LogicalOperator};
use super::object_id::ObjectId;

/// Field holding the backend primary key
pub const PRIMARY_KEY_FIELD: &str = "_id";

/// A compiled, backend-native filter document
#[derive(Debug, Clone, PartialEq)]
pub struct BackendFilter(Value);

impl BackendFilter {
    /// Filter matching every document
    pub fn match_all() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Filter on the backend primary key
    pub fn primary_key(id: &ObjectId) -> Self {
        Self(json!({ PRIMARY_KEY_FIELD: id.to_value() }))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// True when the filter has no conditions
    pub fn is_match_all(&self) -> bool {
        matches!(&self.0, Value::Object(map) if map.is_empty())
    }
}

impl From<BackendFilter> for Value {
    fn from(filter: BackendFilter) -> Self {
        filter.0
    }
}

/// Compiles filter models into backend filters
pub struct FilterCompiler;

impl FilterCompiler {
    /// Compiles groups combined by `outer`
    ///
    /// Zero groups match everything, one group is used as-is, and two or
    /// more are wrapped under the outer operator key.
    pub fn compile(groups: &[DataQueryGroup], outer: LogicalOperator) -> FilterResult<BackendFilter> {
        let mut compiled = groups
            .iter()
            .enumerate()
            .map(|(index, group)| Self::compile_group(index, group))
            .collect::<FilterResult<Vec<Value>>>()?;

        let filter = match compiled.len() {
            0 => return Ok(BackendFilter::match_all()),
            1 => compiled.remove(0),
            _ => json!({ outer.key(): compiled }),
        };
        Ok(BackendFilter(filter))
    }

    /// Compiles one group; a single predicate is never wrapped
    fn compile_group(index: usize, group: &DataQueryGroup) -> FilterResult<Value> {
        let mut predicates = group
            .data_queries
            .iter()
            .map(Self::compile_predicate)
            .collect::<FilterResult<Vec<Value>>>()?;

        match predicates.len() {
            0 => Err(FilterError::EmptyGroup(index)),
            1 => Ok(predicates.remove(0)),
            _ => Ok(json!({ group.operator.key(): predicates })),
        }
    }

    /// Compiles a single predicate
    pub fn compile_predicate(query: &DataQuery) -> FilterResult<Value> {
        if query.has_primary_key() {
            let id = ObjectId::parse_str(&query.id_value)?;
            return Ok(json!({ PRIMARY_KEY_FIELD: id.to_value() }));
        }

        let field = query.field_name.as_str();

        if query.is_bool {
            return Ok(json!({ field: query.bool_value }));
        }

        if query.wildcard {
            let condition = if query.case_sensitive {
                json!({ "$regex": query.field_value })
            } else {
                json!({ "$regex": query.field_value, "$options": "i" })
            };
            return Ok(json!({ field: condition }));
        }

        let value = query.field_value.as_str();
        let predicate = match (query.case_sensitive, query.negate) {
            (true, true) => json!({ field: { "$ne": value } }),
            (true, false) => json!({ field: value }),
            // Anchors only: a delimited /pattern/ does not behave the same on single-document lookups.
            (false, _) => json!({
                field: {
                    "$regex": format!("^{}$", regex::escape(value)),
                    "$options": "i",
                }
            }),
        };
        Ok(predicate)
    }
}

/// Shorthand for [`FilterCompiler::compile`]
pub fn compile(groups: &[DataQueryGroup], outer: LogicalOperator) -> FilterResult<BackendFilter> {
    FilterCompiler::compile(groups, outer)
}
