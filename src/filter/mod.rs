//! Query filter model and compiler
//!
//! Callers describe what they want as groups of named-field predicates;
//! the compiler turns that description into the filter document the
//! backend understands. Nothing here touches a backend.

mod compiler;
mod errors;
mod model;
mod object_id;

pub use compiler::{compile, BackendFilter, FilterCompiler, PRIMARY_KEY_FIELD};
pub use errors::{FilterError, FilterResult};
pub use model::{DataQuery, DataQueryGroup, LogicalOperator};
pub use object_id::{ObjectId, OID_KEY};
