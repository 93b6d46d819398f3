//! Token domain service
//!
//! Token operations on top of the record store. All lookups are scoped to
//! a domain; tokens are never visible across domains.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::errors::{TokenError, TokenResult};
use super::queries::{by_domain, by_domain_and_id, by_domain_and_ids, SoftDelete};
use super::token::{BatchOutcome, NewToken, Token, TokenFailure};
use crate::crypto::{check_key, AesGcmCipher, CipherResult, ValueCipher};
use crate::datastore::RecordStore;
use crate::filter::LogicalOperator;
use crate::observability::Event;

/// Collection used when none is configured
pub const DEFAULT_COLLECTION: &str = "community";

pub struct TokenService {
    store: Arc<RecordStore>,
    collection: String,
    cipher: Arc<dyn ValueCipher>,
    /// When set, new tokens also carry their value encrypted under this key
    encryption_key: Option<Vec<u8>>,
}

impl TokenService {
    pub fn new(store: Arc<RecordStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            cipher: Arc::new(AesGcmCipher::new()),
            encryption_key: None,
        }
    }

    pub fn with_cipher(mut self, cipher: Arc<dyn ValueCipher>) -> Self {
        self.cipher = cipher;
        self
    }

    /// Encrypts values at rest under `key`
    pub fn with_encryption_key(mut self, key: impl Into<Vec<u8>>) -> CipherResult<Self> {
        let key = key.into();
        check_key(&key)?;
        self.encryption_key = Some(key);
        Ok(self)
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn create_token(&self, domain: &str, value: &str) -> TokenResult<Token> {
        if domain.trim().is_empty() || value.trim().is_empty() {
            return Err(TokenError::EmptyValue);
        }

        let mut token = Token::new(Uuid::new_v4().to_string(), domain, value);
        if let Some(key) = &self.encryption_key {
            token.encrypted_value = Some(self.cipher.encrypt(value, key)?);
        }

        let created = self.store.insert(&self.collection, token)?;
        info!(
            event = Event::TokenCreated.as_str(),
            domain,
            id = %created.uuid,
            "token created"
        );
        Ok(created)
    }

    /// Creates every valid item; invalid or failed items are reported
    /// individually and never abort the batch
    pub fn create_tokens(&self, domain: &str, items: Vec<NewToken>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for item in items {
            match self.create_batch_item(domain, &item) {
                Ok(token) => outcome.created.push(token),
                Err(e) => {
                    warn!(
                        event = Event::TokenBatchItemFailed.as_str(),
                        domain,
                        code = e.code(),
                        error = %e,
                        "batch item rejected"
                    );
                    outcome.errors.push(TokenFailure {
                        token: item,
                        code: e.code().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            event = Event::TokenBatchCreated.as_str(),
            domain,
            created = outcome.created.len(),
            failed = outcome.errors.len(),
            "batch create finished"
        );
        outcome
    }

    fn create_batch_item(&self, domain: &str, item: &NewToken) -> TokenResult<Token> {
        if item.domain_uuid.trim().is_empty() {
            return Err(TokenError::MissingDomainId);
        }
        if item.domain_uuid != domain {
            return Err(TokenError::DomainMismatch {
                expected: domain.to_string(),
                found: item.domain_uuid.clone(),
            });
        }
        self.create_token(domain, &item.value)
    }

    /// A live token of the domain
    pub fn get_token(&self, domain: &str, id: &str) -> TokenResult<Token> {
        require_scope(domain, id)?;
        let groups = by_domain_and_id(domain, id, SoftDelete::Exclude);
        Ok(self.store.get_one(&self.collection, &groups, LogicalOperator::And)?)
    }

    /// One page of the domain's live tokens
    pub fn get_tokens(&self, domain: &str, start: i64, limit: i64) -> TokenResult<Vec<Token>> {
        if domain.trim().is_empty() {
            return Err(TokenError::MissingDomainId);
        }
        let groups = by_domain(domain, SoftDelete::Exclude);
        Ok(self
            .store
            .get_many(&self.collection, &groups, LogicalOperator::And, start, limit)?)
    }

    /// Values of the given live tokens, in the order of `ids`
    ///
    /// Ids without a match are skipped, so the output can be shorter than
    /// the input. Ids are looked up in chunks of the store's page cap, so
    /// every match is returned however many ids are asked for.
    pub fn get_token_values(&self, domain: &str, ids: &[String]) -> TokenResult<Vec<String>> {
        if domain.trim().is_empty() {
            return Err(TokenError::MissingDomainId);
        }
        if ids.is_empty() {
            return Err(TokenError::MissingTokenIds);
        }

        let chunk_size = usize::try_from(self.store.config().max_records)
            .unwrap_or(usize::MAX)
            .max(1);
        let mut by_id: HashMap<String, String> = HashMap::with_capacity(ids.len());
        for chunk in ids.chunks(chunk_size) {
            let groups = by_domain_and_ids(domain, chunk, SoftDelete::Exclude);
            let tokens: Vec<Token> = self
                .store
                .get_many(&self.collection, &groups, LogicalOperator::And, 0, 0)?;
            by_id.extend(tokens.into_iter().map(|t| (t.uuid, t.value)));
        }

        Ok(ids
            .iter()
            .filter_map(|id| by_id.get(id).cloned())
            .collect())
    }

    /// Soft-deletes a token; deleting an already deleted token succeeds
    pub fn delete_token(&self, domain: &str, id: &str) -> TokenResult<Token> {
        require_scope(domain, id)?;
        let groups = by_domain_and_id(domain, id, SoftDelete::Include);

        let mut token: Token = self.store.get_one(&self.collection, &groups, LogicalOperator::And)?;
        token.is_deleted = true;
        let updated = self
            .store
            .update(&self.collection, &groups, LogicalOperator::And, token)?;

        info!(event = Event::TokenDeleted.as_str(), domain, id, "token deleted");
        Ok(updated)
    }

    /// Checks the stored checksum of a token the domain owns
    pub fn verify_token(&self, domain: &str, id: &str) -> TokenResult<bool> {
        require_scope(domain, id)?;
        let groups = by_domain_and_id(domain, id, SoftDelete::Include);
        let token: Token = self.store.get_one(&self.collection, &groups, LogicalOperator::And)?;
        Ok(self.store.validate_checksum(&self.collection, &token.uuid)?)
    }

    pub fn encrypt_value(&self, plaintext: &str, key: &[u8]) -> TokenResult<String> {
        Ok(self.cipher.encrypt(plaintext, key)?)
    }

    pub fn decrypt_value(&self, ciphertext: &str, key: &[u8]) -> TokenResult<String> {
        Ok(self.cipher.decrypt(ciphertext, key)?)
    }

    /// Encrypts each value, dropping any that fail
    ///
    /// The output does not say which inputs were dropped; use
    /// [`TokenService::try_encrypt_values`] when that matters.
    pub fn encrypt_values(&self, plaintexts: &[String], key: &[u8]) -> Vec<String> {
        keep_successes(self.try_encrypt_values(plaintexts, key))
    }

    /// Decrypts each value, dropping any that fail
    pub fn decrypt_values(&self, ciphertexts: &[String], key: &[u8]) -> Vec<String> {
        keep_successes(self.try_decrypt_values(ciphertexts, key))
    }

    /// One result per input, in input order
    pub fn try_encrypt_values(&self, plaintexts: &[String], key: &[u8]) -> Vec<CipherResult<String>> {
        plaintexts.iter().map(|p| self.cipher.encrypt(p, key)).collect()
    }

    /// One result per input, in input order
    pub fn try_decrypt_values(&self, ciphertexts: &[String], key: &[u8]) -> Vec<CipherResult<String>> {
        ciphertexts.iter().map(|c| self.cipher.decrypt(c, key)).collect()
    }
}

fn require_scope(domain: &str, id: &str) -> TokenResult<()> {
    if domain.trim().is_empty() {
        return Err(TokenError::MissingDomainId);
    }
    if id.trim().is_empty() {
        return Err(TokenError::MissingTokenId);
    }
    Ok(())
}

fn keep_successes(results: Vec<CipherResult<String>>) -> Vec<String> {
    results
        .into_iter()
        .filter_map(|result| match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(event = Event::CipherFailed.as_str(), code = e.code(), "value dropped from batch");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::{MemoryConnector, StoreConfig};

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn service() -> TokenService {
        let store = RecordStore::new(StoreConfig::default(), Arc::new(MemoryConnector::new()));
        TokenService::new(Arc::new(store), DEFAULT_COLLECTION)
    }

    #[test]
    fn test_create_token_rejects_blank_input() {
        let svc = service();
        assert_eq!(svc.create_token("  ", "v").unwrap_err(), TokenError::EmptyValue);
        assert_eq!(svc.create_token("acme", "\t").unwrap_err(), TokenError::EmptyValue);
    }

    #[test]
    fn test_create_and_get() {
        let svc = service();
        let created = svc.create_token("acme", "secret").unwrap();
        assert!(Uuid::parse_str(&created.uuid).is_ok());
        assert_eq!(created.meta.document_type, "token");
        assert_eq!(created.meta.version, "001");
        assert!(created.meta.created > 0);
        assert!(!created.meta.check.is_empty());

        let fetched = svc.get_token("acme", &created.uuid).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_get_token_is_domain_scoped() {
        let svc = service();
        let created = svc.create_token("acme", "secret").unwrap();
        let err = svc.get_token("other", &created.uuid).unwrap_err();
        assert_eq!(err, TokenError::Store(crate::datastore::StoreError::NotFound));
    }

    #[test]
    fn test_get_token_requires_arguments() {
        let svc = service();
        assert_eq!(svc.get_token("", "x").unwrap_err(), TokenError::MissingDomainId);
        assert_eq!(svc.get_token("acme", " ").unwrap_err(), TokenError::MissingTokenId);
    }

    #[test]
    fn test_encryption_key_fills_encrypted_value() {
        let svc = service().with_encryption_key(KEY).unwrap();
        let created = svc.create_token("acme", "secret").unwrap();
        let sealed = created.encrypted_value.unwrap();
        assert_eq!(svc.decrypt_value(&sealed, KEY).unwrap(), "secret");
    }

    #[test]
    fn test_with_encryption_key_rejects_bad_length() {
        assert!(service().with_encryption_key(b"short".to_vec()).is_err());
    }

    #[test]
    fn test_batch_cipher_helpers_drop_failures() {
        let svc = service();
        let sealed = svc.encrypt_values(&["a".to_string(), "b".to_string()], KEY);
        assert_eq!(sealed.len(), 2);

        let inputs = vec![sealed[0].clone(), "garbage".to_string(), sealed[1].clone()];
        assert_eq!(svc.decrypt_values(&inputs, KEY), vec!["a".to_string(), "b".to_string()]);

        let detailed = svc.try_decrypt_values(&inputs, KEY);
        assert_eq!(detailed.len(), 3);
        assert!(detailed[1].is_err());
    }

    #[test]
    fn test_verify_token() {
        let svc = service();
        let created = svc.create_token("acme", "secret").unwrap();
        assert!(svc.verify_token("acme", &created.uuid).unwrap());
    }
}
