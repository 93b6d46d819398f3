//! Token domain
//!
//! Create, look up and soft-delete tokens per domain, plus value
//! encryption helpers.

mod errors;
mod queries;
mod service;
mod token;

pub use errors::{TokenError, TokenResult};
pub use queries::{by_domain, by_domain_and_id, by_domain_and_ids, SoftDelete, DELETED_FIELD, DOMAIN_FIELD, UUID_FIELD};
pub use service::{TokenService, DEFAULT_COLLECTION};
pub use token::{BatchOutcome, NewToken, Token, TokenFailure, TokenQuery};
