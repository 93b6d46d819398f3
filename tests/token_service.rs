//! Token Service Tests
//!
//! Test Categories:
//! 1. Batch create partial success
//! 2. Batch value lookup ordering
//! 3. Soft delete
//! 4. Domain isolation and paging

use std::sync::Arc;

use serde_json::json;

use tarpon::datastore::{
    DocumentBackend, MemoryBackend, MemoryConnector, RecordStore, StoreConfig, StoreError,
};
use tarpon::filter::BackendFilter;
use tarpon::tokenizer::{NewToken, TokenError, TokenService, DEFAULT_COLLECTION};

fn service_with_backend() -> (TokenService, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let connector = MemoryConnector::with_backend(Arc::clone(&backend));
    let store = RecordStore::new(StoreConfig::default(), Arc::new(connector));
    (TokenService::new(Arc::new(store), DEFAULT_COLLECTION), backend)
}

fn service() -> TokenService {
    service_with_backend().0
}

// =============================================================================
// BATCH CREATE
// =============================================================================

#[test]
fn test_create_tokens_partial_success() {
    let svc = service();
    let items = vec![
        NewToken::new("acme", "4111-1111"),
        NewToken::new("acme", "   "),
        NewToken::new("other", "5500-0000"),
    ];

    let outcome = svc.create_tokens("acme", items);

    assert_eq!(outcome.created.len(), 1);
    assert_eq!(outcome.created[0].value, "4111-1111");
    assert_eq!(outcome.errors.len(), 2);

    assert_eq!(outcome.errors[0].token, NewToken::new("acme", "   "));
    assert_eq!(outcome.errors[0].code, "TOKEN_EMPTY_VALUE");
    assert_eq!(outcome.errors[1].token, NewToken::new("other", "5500-0000"));
    assert_eq!(outcome.errors[1].code, "TOKEN_DOMAIN_MISMATCH");
    assert!(!outcome.is_complete());
}

#[test]
fn test_create_tokens_missing_domain() {
    let svc = service();
    let outcome = svc.create_tokens("acme", vec![NewToken::new("", "v")]);
    assert!(outcome.created.is_empty());
    assert_eq!(outcome.errors[0].code, "TOKEN_MISSING_DOMAIN_ID");
}

// =============================================================================
// VALUE LOOKUP
// =============================================================================

#[test]
fn test_get_token_values_follow_input_order() {
    let svc = service();
    let a = svc.create_token("acme", "A").unwrap();
    let b = svc.create_token("acme", "B").unwrap();
    let c = svc.create_token("acme", "C").unwrap();

    let values = svc
        .get_token_values("acme", &[c.uuid.clone(), a.uuid.clone(), b.uuid.clone()])
        .unwrap();
    assert_eq!(values, vec!["C", "A", "B"]);
}

#[test]
fn test_get_token_values_skip_misses() {
    let svc = service();
    let b = svc.create_token("acme", "B").unwrap();
    let c = svc.create_token("acme", "C").unwrap();

    let values = svc
        .get_token_values("acme", &[c.uuid.clone(), "missing".to_string(), b.uuid.clone()])
        .unwrap();
    assert_eq!(values, vec!["C", "B"]);
}

#[test]
fn test_get_token_values_exclude_deleted_and_foreign() {
    let svc = service();
    let live = svc.create_token("acme", "live").unwrap();
    let gone = svc.create_token("acme", "gone").unwrap();
    let foreign = svc.create_token("other", "foreign").unwrap();
    svc.delete_token("acme", &gone.uuid).unwrap();

    let values = svc
        .get_token_values("acme", &[gone.uuid, foreign.uuid, live.uuid])
        .unwrap();
    assert_eq!(values, vec!["live"]);
}

#[test]
fn test_get_token_values_beyond_one_page() {
    let svc = service();
    let ids: Vec<String> = (0..150)
        .map(|i| svc.create_token("acme", &format!("v{}", i)).unwrap().uuid)
        .collect();

    let values = svc.get_token_values("acme", &ids).unwrap();
    assert_eq!(values.len(), 150);
    assert_eq!(values[0], "v0");
    assert_eq!(values[149], "v149");
}

#[test]
fn test_get_token_values_chunks_follow_configured_cap() {
    let config = StoreConfig {
        max_records: 2,
        ..Default::default()
    };
    let store = RecordStore::new(config, Arc::new(MemoryConnector::new()));
    let svc = TokenService::new(Arc::new(store), DEFAULT_COLLECTION);
    let a = svc.create_token("acme", "A").unwrap();
    let b = svc.create_token("acme", "B").unwrap();
    let c = svc.create_token("acme", "C").unwrap();

    let ids = vec![c.uuid, "missing".to_string(), b.uuid, a.uuid.clone(), a.uuid];
    let values = svc.get_token_values("acme", &ids).unwrap();
    assert_eq!(values, vec!["C", "B", "A", "A"]);
}

#[test]
fn test_get_token_values_validation() {
    let svc = service();
    assert_eq!(
        svc.get_token_values("acme", &[]).unwrap_err(),
        TokenError::MissingTokenIds
    );
    assert_eq!(
        svc.get_token_values(" ", &["x".to_string()]).unwrap_err(),
        TokenError::MissingDomainId
    );
}

// =============================================================================
// SOFT DELETE
// =============================================================================

#[test]
fn test_delete_twice_succeeds() {
    let svc = service();
    let token = svc.create_token("acme", "secret").unwrap();

    let first = svc.delete_token("acme", &token.uuid).unwrap();
    assert!(first.is_deleted);

    let second = svc.delete_token("acme", &token.uuid).unwrap();
    assert!(second.is_deleted);

    let err = svc.get_token("acme", &token.uuid).unwrap_err();
    assert_eq!(err, TokenError::Store(StoreError::NotFound));
}

#[test]
fn test_delete_keeps_checksum_valid() {
    let svc = service();
    let token = svc.create_token("acme", "secret").unwrap();
    svc.delete_token("acme", &token.uuid).unwrap();
    assert!(svc.verify_token("acme", &token.uuid).unwrap());
}

#[test]
fn test_delete_unknown_token_is_not_found() {
    let svc = service();
    let err = svc.delete_token("acme", "no-such-token").unwrap_err();
    assert_eq!(err, TokenError::Store(StoreError::NotFound));
}

#[test]
fn test_verify_detects_tampering() {
    let (svc, backend) = service_with_backend();
    let token = svc.create_token("acme", "secret").unwrap();

    backend
        .update_one(
            "tarpon",
            DEFAULT_COLLECTION,
            &BackendFilter::from_value(json!({"uuid": token.uuid.clone()})),
            json!({"value": "swapped"}),
        )
        .unwrap();

    assert!(!svc.verify_token("acme", &token.uuid).unwrap());
}

// =============================================================================
// LISTING
// =============================================================================

#[test]
fn test_get_tokens_is_domain_scoped_and_capped() {
    let svc = service();
    for i in 0..3 {
        svc.create_token("acme", &format!("v{}", i)).unwrap();
    }
    svc.create_token("other", "x").unwrap();

    let tokens = svc.get_tokens("acme", 0, 10_000).unwrap();
    assert_eq!(tokens.len(), 3);
    assert!(tokens.iter().all(|t| t.domain_uuid == "acme"));

    let page = svc.get_tokens("acme", 1, 1).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].value, "v1");
}
