//! Token HTTP Routes
//!
//! JSON endpoints over [`TokenService`]. Service calls are synchronous and
//! run on the blocking pool.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::errors::{ApiError, ApiResult};
use crate::tokenizer::{NewToken, Token, TokenError, TokenQuery, TokenResult, TokenService};

// ==================
// Shared State
// ==================

/// Token state shared across handlers
pub struct TokenState {
    pub service: Arc<TokenService>,
    /// Page size when a list request gives no limit
    pub page_record_count: i64,
}

impl TokenState {
    pub fn new(service: Arc<TokenService>, page_record_count: i64) -> Self {
        Self {
            service,
            page_record_count,
        }
    }
}

// ==================
// Request/Response Types
// ==================

/// Paging query parameters, parsed leniently
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub start: Option<String>,
    pub limit: Option<String>,
}

impl PageParams {
    /// Unparseable values fall back to 0; an absent limit uses `default_limit`
    pub fn resolve(&self, default_limit: i64) -> (i64, i64) {
        let start = self
            .start
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(0)
            .max(0);
        let limit = match self.limit.as_deref() {
            Some(s) => s.trim().parse::<i64>().unwrap_or(0),
            None => default_limit,
        };
        (start, limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub uuid: String,
    pub valid: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub result: String,
}

// ==================
// Router
// ==================

pub fn token_routes(state: Arc<TokenState>) -> Router {
    Router::new()
        .route("/echo", get(echo_handler))
        .route("/tokens/:domain_id", get(list_tokens_handler).put(create_tokens_handler))
        .route("/tokens/:domain_id/values", post(token_values_handler))
        .route(
            "/tokens/:domain_id/:id",
            get(get_token_handler)
                .put(create_token_handler)
                .delete(delete_token_handler),
        )
        .route("/tokens/:domain_id/:id/value", get(get_token_value_handler))
        .route("/tokens/:domain_id/:id/verify", get(verify_token_handler))
        .with_state(state)
}

/// Runs a service call on the blocking pool
async fn blocking<T, F>(call: F) -> ApiResult<T>
where
    F: FnOnce() -> TokenResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::Malformed(rejection.body_text()))
}

// ==================
// Handlers
// ==================

async fn echo_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        result: "ok".to_string(),
    })
}

async fn list_tokens_handler(
    State(state): State<Arc<TokenState>>,
    Path(domain_id): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Vec<Token>>> {
    let (start, limit) = params.resolve(state.page_record_count);
    let service = Arc::clone(&state.service);
    let tokens = blocking(move || service.get_tokens(&domain_id, start, limit)).await?;
    Ok(Json(tokens))
}

/// 201 with the created tokens, or 207 with created and failed items
async fn create_tokens_handler(
    State(state): State<Arc<TokenState>>,
    Path(domain_id): Path<String>,
    payload: Result<Json<Vec<NewToken>>, JsonRejection>,
) -> ApiResult<Response> {
    let items = body(payload)?;
    if items.is_empty() {
        return Err(ApiError::EmptyBatch);
    }

    let service = Arc::clone(&state.service);
    let outcome = blocking(move || Ok(service.create_tokens(&domain_id, items))).await?;

    if outcome.is_complete() {
        Ok((StatusCode::CREATED, Json(outcome.created)).into_response())
    } else {
        Ok((StatusCode::MULTI_STATUS, Json(outcome)).into_response())
    }
}

async fn token_values_handler(
    State(state): State<Arc<TokenState>>,
    Path(domain_id): Path<String>,
    payload: Result<Json<TokenQuery>, JsonRejection>,
) -> ApiResult<Json<Vec<String>>> {
    let query = body(payload)?;
    if !query.domain_uuid.is_empty() && query.domain_uuid != domain_id {
        return Err(TokenError::DomainMismatch {
            expected: domain_id,
            found: query.domain_uuid,
        }
        .into());
    }

    let service = Arc::clone(&state.service);
    let values = blocking(move || service.get_token_values(&domain_id, &query.uuids)).await?;
    Ok(Json(values))
}

async fn get_token_handler(
    State(state): State<Arc<TokenState>>,
    Path((domain_id, id)): Path<(String, String)>,
) -> ApiResult<Json<Token>> {
    let service = Arc::clone(&state.service);
    let token = blocking(move || service.get_token(&domain_id, &id)).await?;
    Ok(Json(token))
}

/// The path id is ignored; the service assigns a fresh one
async fn create_token_handler(
    State(state): State<Arc<TokenState>>,
    Path((domain_id, _id)): Path<(String, String)>,
    payload: Result<Json<NewToken>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Token>)> {
    let item = body(payload)?;
    let service = Arc::clone(&state.service);
    let token = blocking(move || service.create_token(&domain_id, &item.value)).await?;
    Ok((StatusCode::CREATED, Json(token)))
}

async fn delete_token_handler(
    State(state): State<Arc<TokenState>>,
    Path((domain_id, id)): Path<(String, String)>,
) -> ApiResult<Json<Token>> {
    let service = Arc::clone(&state.service);
    let token = blocking(move || service.delete_token(&domain_id, &id)).await?;
    Ok(Json(token))
}

async fn get_token_value_handler(
    State(state): State<Arc<TokenState>>,
    Path((domain_id, id)): Path<(String, String)>,
) -> ApiResult<Json<String>> {
    let service = Arc::clone(&state.service);
    let token = blocking(move || service.get_token(&domain_id, &id)).await?;
    Ok(Json(token.value))
}

async fn verify_token_handler(
    State(state): State<Arc<TokenState>>,
    Path((domain_id, id)): Path<(String, String)>,
) -> ApiResult<Json<VerifyResponse>> {
    let service = Arc::clone(&state.service);
    let uuid = id.clone();
    let valid = blocking(move || service.verify_token(&domain_id, &id)).await?;
    Ok(Json(VerifyResponse { uuid, valid }))
}
