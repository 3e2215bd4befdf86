//! One-time verification codes.
//!
//! Pending codes live behind the [`KeyedStore`] trait so a persistent cache
//! can be injected for multi-instance deployments; the default in-memory
//! implementation does not survive a process restart (a documented
//! limitation carried over from the system this replaces).

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{AppError, Result};

/// A pending verification entry: the code and its absolute expiry instant.
#[derive(Debug, Clone)]
pub struct PendingCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Keyed value store with last-write-wins semantics. Expiry is a property of
/// the stored value, checked by the reader.
#[async_trait]
pub trait KeyedStore<V: Clone + Send + Sync + 'static>: Send + Sync {
    async fn get(&self, key: &str) -> Option<V>;
    async fn put(&self, key: &str, value: V);
    async fn remove(&self, key: &str);
}

/// Process-local map store.
pub struct InMemoryStore<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V> InMemoryStore<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> Default for InMemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V: Clone + Send + Sync + 'static> KeyedStore<V> for InMemoryStore<V> {
    async fn get(&self, key: &str) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    async fn put(&self, key: &str, value: V) {
        self.entries.write().await.insert(key.to_string(), value);
    }

    async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

/// Six uppercase hex characters, matching the legacy code format.
pub fn generate_code() -> String {
    let bytes: [u8; 3] = rand::rng().random();
    hex::encode(bytes).to_uppercase()
}

/// Six decimal digits, used for password-reset codes.
pub fn generate_reset_code() -> String {
    rand::rng().random_range(100_000..1_000_000).to_string()
}

/// Issues and verifies single-use codes keyed by email address.
pub struct VerificationService {
    codes: Arc<dyn KeyedStore<PendingCode>>,
    ttl: Duration,
}

impl VerificationService {
    pub fn new(codes: Arc<dyn KeyedStore<PendingCode>>, ttl_secs: u64) -> Self {
        Self {
            codes,
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Create (or overwrite) the pending code for an identifier. A resend
    /// implicitly invalidates the previous code.
    pub async fn issue(&self, email: &str) -> String {
        let code = generate_code();
        self.codes
            .put(
                email,
                PendingCode {
                    code: code.clone(),
                    expires_at: Utc::now() + self.ttl,
                },
            )
            .await;
        code
    }

    /// Whether a code is outstanding for this identifier.
    pub async fn is_pending(&self, email: &str) -> bool {
        self.codes.get(email).await.is_some()
    }

    /// Verify and consume a code. Missing entry, mismatch, and expiry all
    /// fail the same way; the entry is removed only on success.
    pub async fn verify(&self, email: &str, code: &str) -> Result<()> {
        let entry = self.codes.get(email).await;

        match entry {
            Some(ref pending) if pending.code == code && Utc::now() <= pending.expires_at => {
                self.codes.remove(email).await;
                Ok(())
            }
            _ => Err(AppError::Unauthorized(
                "Invalid or expired verification code".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> VerificationService {
        VerificationService::new(Arc::new(InMemoryStore::new()), 3600)
    }

    #[test]
    fn test_generated_code_format() {
        for _ in 0..20 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(code, code.to_uppercase());
        }
    }

    #[test]
    fn test_reset_code_is_six_digits() {
        for _ in 0..20 {
            let code = generate_reset_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_verify_consumes_code_exactly_once() {
        let svc = service();
        let code = svc.issue("a@example.com").await;

        svc.verify("a@example.com", &code).await.unwrap();
        // Second attempt fails: the entry was consumed.
        assert!(svc.verify("a@example.com", &code).await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_code_fails_and_leaves_entry() {
        let svc = service();
        let code = svc.issue("a@example.com").await;

        assert!(svc.verify("a@example.com", "000000").await.is_err());
        // The real code still works afterwards.
        svc.verify("a@example.com", &code).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_entry_fails() {
        let svc = service();
        assert!(svc.verify("nobody@example.com", "ABCDEF").await.is_err());
    }

    #[tokio::test]
    async fn test_expired_code_fails_and_is_not_consumed() {
        let store: Arc<dyn KeyedStore<PendingCode>> = Arc::new(InMemoryStore::new());
        let svc = VerificationService::new(store.clone(), 3600);

        store
            .put(
                "a@example.com",
                PendingCode {
                    code: "ABC123".into(),
                    expires_at: Utc::now() - Duration::seconds(1),
                },
            )
            .await;

        assert!(svc.verify("a@example.com", "ABC123").await.is_err());
        // Entry remains until overwritten or successfully consumed.
        assert!(store.get("a@example.com").await.is_some());
    }

    #[tokio::test]
    async fn test_resend_overwrites_previous_code() {
        let svc = service();
        let first = svc.issue("a@example.com").await;
        let second = svc.issue("a@example.com").await;

        if first != second {
            assert!(svc.verify("a@example.com", &first).await.is_err());
        }
        svc.verify("a@example.com", &second).await.unwrap();
    }
}
