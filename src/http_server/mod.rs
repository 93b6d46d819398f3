//! # Tarpon HTTP Server Module
//!
//! JSON API over the token service.
//!
//! # Endpoints
//!
//! - `GET /echo` - Liveness check
//! - `GET|PUT /tokens/:domain_id` - List / batch create
//! - `POST /tokens/:domain_id/values` - Values for a list of token ids
//! - `GET|PUT|DELETE /tokens/:domain_id/:id` - Get / create / soft-delete
//! - `GET /tokens/:domain_id/:id/value` - Token value
//! - `GET /tokens/:domain_id/:id/verify` - Checksum verification

pub mod config;
pub mod errors;
pub mod server;
pub mod token_routes;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::HttpServer;
pub use token_routes::{token_routes, TokenState, VerifyResponse};
