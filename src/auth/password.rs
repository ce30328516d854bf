use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{BCRYPT_MAX_COST, BCRYPT_MIN_COST};

/// bcrypt ignores everything past this many bytes of input
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt cost {0} is out of range")]
    InvalidCost(u32),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Password hashing timed out after {0:?}")]
    Timeout(Duration),

    #[error("Password hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Salted, adaptive password hashing backed by bcrypt.
///
/// Hashing is CPU bound; the async helpers move it onto the blocking pool
/// and bound it with a timeout so a slow host cannot stall the runtime.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    timeout: Duration,
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    pub fn new(cost: u32, timeout: Duration) -> Result<Self, PasswordError> {
        if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&cost) {
            return Err(PasswordError::InvalidCost(cost));
        }
        // Hashed once here; verify_dummy only ever verifies
        let dummy_hash = bcrypt::hash("social-api-dummy-password", cost)?;
        Ok(Self {
            cost,
            timeout,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A mismatch is `Ok(false)`; only a malformed stored hash is an error.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        Ok(bcrypt::verify(password, hash)?)
    }

    /// Burn one verification worth of CPU against a throwaway hash.
    ///
    /// Used when the account does not exist, so that the response time of
    /// "unknown email" matches "wrong password".
    pub fn verify_dummy(&self, password: &str) -> Result<(), PasswordError> {
        let _ = bcrypt::verify(password, &*self.dummy_hash)?;
        Ok(())
    }

    pub async fn hash_async(&self, password: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        self.run_blocking(move || hasher.hash(&password)).await
    }

    pub async fn verify_async(
        &self,
        password: String,
        hash: String,
    ) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        self.run_blocking(move || hasher.verify(&password, &hash)).await
    }

    pub async fn verify_dummy_async(&self, password: String) -> Result<(), PasswordError> {
        let hasher = self.clone();
        self.run_blocking(move || hasher.verify_dummy(&password)).await
    }

    async fn run_blocking<T, F>(&self, work: F) -> Result<T, PasswordError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    {
        let task = tokio::task::spawn_blocking(work);
        match tokio::time::timeout(self.timeout, task).await {
            Ok(joined) => joined?,
            Err(_) => Err(PasswordError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(BCRYPT_MIN_COST, Duration::from_secs(30)).unwrap()
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = hasher();
        let hash = hasher.hash("secret123").unwrap();
        assert_ne!(hash, "secret123");
        assert!(hasher.verify("secret123", &hash).unwrap());
        assert!(!hasher.verify("secret124", &hash).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differ() {
        let hasher = hasher();
        let first = hasher.hash("secret123").unwrap();
        let second = hasher.hash("secret123").unwrap();
        assert_ne!(first, second);
        assert!(hasher.verify("secret123", &first).unwrap());
        assert!(hasher.verify("secret123", &second).unwrap());
    }

    #[test]
    fn test_hash_embeds_configured_cost() {
        let hasher = PasswordHasher::new(5, Duration::from_secs(30)).unwrap();
        let hash = hasher.hash("secret123").unwrap();
        assert!(hash.starts_with("$2b$05$"), "unexpected hash prefix: {}", hash);
    }

    #[test]
    fn test_rejects_out_of_range_cost() {
        assert!(matches!(
            PasswordHasher::new(3, Duration::from_secs(1)),
            Err(PasswordError::InvalidCost(3))
        ));
        assert!(PasswordHasher::new(32, Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        let hasher = hasher();
        assert!(hasher.verify("secret123", "not-a-bcrypt-hash").is_err());
    }

    #[test]
    fn test_dummy_hash_ready_after_new() {
        let hasher = hasher();
        assert!(hasher.dummy_hash.starts_with("$2b$04$"));

        let clone = hasher.clone();
        assert!(Arc::ptr_eq(&hasher.dummy_hash, &clone.dummy_hash));
    }

    #[test]
    fn test_verify_dummy_succeeds() {
        let hasher = hasher();
        assert!(hasher.verify_dummy("anything").is_ok());
        assert!(hasher.verify_dummy("anything else").is_ok());
    }

    #[tokio::test]
    async fn test_async_helpers() {
        let hasher = hasher();
        let hash = hasher.hash_async("secret123".to_string()).await.unwrap();
        assert!(hasher
            .verify_async("secret123".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!hasher.verify_async("nope".to_string(), hash).await.unwrap());
    }
}
