use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Lowest iteration count the service will run with
pub const MIN_ITERATIONS: u32 = 100_000;
pub const SALT_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

/// Well-formed base64(salt || key) of zeros; no password derives to it
const PLACEHOLDER_DIGEST: &str =
    "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

#[derive(Debug, Error)]
pub enum HashError {
    #[error("hashing worker failed: {0}")]
    Worker(String),

    #[error("hashing pool closed")]
    PoolClosed,
}

/// PBKDF2-HMAC-SHA256 digests, encoded as base64(salt || key).
///
/// The async methods run the derivation on the blocking pool; the semaphore
/// bounds how many derivations run at once.
#[derive(Clone)]
pub struct PasswordHasher {
    iterations: u32,
    permits: Arc<Semaphore>,
}

impl PasswordHasher {
    pub fn new(iterations: u32, concurrency: usize) -> Self {
        Self::with_iterations(iterations.max(MIN_ITERATIONS), concurrency)
    }

    /// No iteration floor; lets tests run with cheap digests
    pub fn with_iterations(iterations: u32, concurrency: usize) -> Self {
        Self {
            iterations: iterations.max(1),
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub async fn hash(&self, password: &str) -> Result<String, HashError> {
        let _permit = self.permits.acquire().await.map_err(|_| HashError::PoolClosed)?;
        let password = password.to_owned();
        let iterations = self.iterations;
        tokio::task::spawn_blocking(move || hash_password(&password, iterations))
            .await
            .map_err(|e| HashError::Worker(e.to_string()))
    }

    pub async fn verify(&self, password: &str, digest: &str) -> Result<bool, HashError> {
        let _permit = self.permits.acquire().await.map_err(|_| HashError::PoolClosed)?;
        let password = password.to_owned();
        let digest = digest.to_owned();
        let iterations = self.iterations;
        tokio::task::spawn_blocking(move || verify_password(&password, &digest, iterations))
            .await
            .map_err(|e| HashError::Worker(e.to_string()))
    }

    /// Runs a full derivation against a digest nobody owns, so a login for an
    /// unknown name takes as long as one with a wrong password
    pub async fn verify_placeholder(&self, password: &str) -> Result<(), HashError> {
        self.verify(password, PLACEHOLDER_DIGEST).await.map(|_| ())
    }
}

pub fn hash_password(password: &str, iterations: u32) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut key);

    let mut combined = Vec::with_capacity(SALT_LEN + KEY_LEN);
    combined.extend_from_slice(&salt);
    combined.extend_from_slice(&key);
    STANDARD.encode(combined)
}

/// Malformed digests verify as false
pub fn verify_password(password: &str, digest: &str, iterations: u32) -> bool {
    let Ok(decoded) = STANDARD.decode(digest) else {
        return false;
    };
    if decoded.len() != SALT_LEN + KEY_LEN {
        return false;
    }

    let (salt, stored) = decoded.split_at(SALT_LEN);
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);

    key[..].ct_eq(stored).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHEAP: u32 = 1_000;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let digest = hash_password("correct horse", CHEAP);
        assert!(verify_password("correct horse", &digest, CHEAP));
        assert!(!verify_password("correct horsf", &digest, CHEAP));
        assert!(!verify_password("", &digest, CHEAP));
    }

    #[test]
    fn salts_differ_between_calls() {
        let a = hash_password("secret", CHEAP);
        let b = hash_password("secret", CHEAP);
        assert_ne!(a, b);
        assert!(verify_password("secret", &a, CHEAP));
        assert!(verify_password("secret", &b, CHEAP));
    }

    #[test]
    fn digest_is_salt_plus_key() {
        let decoded = STANDARD.decode(hash_password("x", CHEAP)).unwrap();
        assert_eq!(decoded.len(), SALT_LEN + KEY_LEN);
    }

    #[test]
    fn placeholder_digest_is_well_formed_and_matches_nothing() {
        let decoded = STANDARD.decode(PLACEHOLDER_DIGEST).unwrap();
        assert_eq!(decoded.len(), SALT_LEN + KEY_LEN);
        assert!(!verify_password("", PLACEHOLDER_DIGEST, CHEAP));
        assert!(!verify_password("correct horse", PLACEHOLDER_DIGEST, CHEAP));
    }

    #[tokio::test]
    async fn placeholder_verify_completes() {
        PasswordHasher::with_iterations(CHEAP, 1)
            .verify_placeholder("anything")
            .await
            .unwrap();
    }

    #[test]
    fn malformed_digests_are_false() {
        assert!(!verify_password("x", "", CHEAP));
        assert!(!verify_password("x", "not base64 !!!", CHEAP));
        assert!(!verify_password("x", &STANDARD.encode([0u8; 10]), CHEAP));
        assert!(!verify_password("x", &STANDARD.encode([0u8; 64]), CHEAP));
    }

    #[test]
    fn iteration_floor_applies_to_production_constructor() {
        assert_eq!(PasswordHasher::new(10, 2).iterations(), MIN_ITERATIONS);
        assert_eq!(PasswordHasher::with_iterations(10, 2).iterations(), 10);
    }

    #[tokio::test]
    async fn async_hash_round_trips_off_thread() {
        let hasher = PasswordHasher::with_iterations(CHEAP, 2);
        let digest = hasher.hash("pw").await.unwrap();
        assert!(hasher.verify("pw", &digest).await.unwrap());
        assert!(!hasher.verify("pw2", &digest).await.unwrap());
        assert!(!hasher.verify("pw", "garbage").await.unwrap());
    }
}
