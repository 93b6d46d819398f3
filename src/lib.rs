//! tarpon - a tokenization service
//!
//! Stores opaque tokens for sensitive values per domain, over a
//! backend-agnostic filter compiler, a generic record store and
//! versioned record checksums.

pub mod cli;
pub mod config;
pub mod crypto;
pub mod datastore;
pub mod filter;
pub mod http_server;
pub mod integrity;
pub mod observability;
pub mod tokenizer;
