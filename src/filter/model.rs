//! Filter model
//!
//! Named-field predicates grouped under logical operators. A query is a
//! list of [`DataQueryGroup`] plus one outer [`LogicalOperator`].

use serde::{Deserialize, Serialize};

/// Logical combinator for predicates and groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }

    /// Key used in the compiled backend filter
    pub fn key(&self) -> &'static str {
        match self {
            LogicalOperator::And => "$and",
            LogicalOperator::Or => "$or",
        }
    }
}

/// A single field predicate
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataQuery {
    pub field_name: String,
    pub field_value: String,
    /// Exclude `field_value` instead of matching it
    ///
    /// Only honored for case-sensitive exact predicates. A case-insensitive
    /// predicate compiles to the same anchored regex whether or not this is
    /// set, so it still matches the value. Wildcard and boolean predicates
    /// ignore it too.
    pub negate: bool,
    /// Compare against `bool_value` instead of `field_value`
    pub is_bool: bool,
    pub bool_value: bool,
    /// Primary-key lookup; takes precedence over every other kind when non-blank
    pub id_value: String,
    pub case_sensitive: bool,
    /// Treat `field_value` as a raw pattern instead of an exact value
    pub wildcard: bool,
}

impl DataQuery {
    /// Case-sensitive exact match
    pub fn exact(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field_name: field.into(),
            field_value: value.into(),
            case_sensitive: true,
            ..Default::default()
        }
    }

    /// Case-insensitive exact match
    pub fn exact_ignore_case(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field_name: field.into(),
            field_value: value.into(),
            case_sensitive: false,
            ..Default::default()
        }
    }

    /// Case-sensitive inequality
    pub fn not_equal(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            negate: true,
            ..Self::exact(field, value)
        }
    }

    /// Pattern match using `pattern` as a raw regular expression
    pub fn wildcard(field: impl Into<String>, pattern: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            field_name: field.into(),
            field_value: pattern.into(),
            wildcard: true,
            case_sensitive,
            ..Default::default()
        }
    }

    /// Boolean equality
    pub fn boolean(field: impl Into<String>, value: bool) -> Self {
        Self {
            field_name: field.into(),
            is_bool: true,
            bool_value: value,
            ..Default::default()
        }
    }

    /// Lookup by backend primary key (hex form)
    pub fn primary_key(id: impl Into<String>) -> Self {
        Self {
            id_value: id.into(),
            ..Default::default()
        }
    }

    pub fn has_primary_key(&self) -> bool {
        !self.id_value.trim().is_empty()
    }
}

/// Predicates combined by the group's own operator
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQueryGroup {
    pub data_queries: Vec<DataQuery>,
    #[serde(default)]
    pub operator: LogicalOperator,
}

impl DataQueryGroup {
    pub fn new(operator: LogicalOperator, data_queries: Vec<DataQuery>) -> Self {
        Self {
            data_queries,
            operator,
        }
    }

    /// All predicates must hold
    pub fn all(data_queries: Vec<DataQuery>) -> Self {
        Self::new(LogicalOperator::And, data_queries)
    }

    /// Any predicate may hold
    pub fn any(data_queries: Vec<DataQuery>) -> Self {
        Self::new(LogicalOperator::Or, data_queries)
    }

    pub fn single(query: DataQuery) -> Self {
        Self::all(vec![query])
    }

    pub fn push(&mut self, query: DataQuery) {
        self.data_queries.push(query);
    }

    pub fn len(&self) -> usize {
        self.data_queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_queries.is_empty()
    }
}
