//! Password hashing capability.
//!
//! Exported for user and auth services built on this crate.

use crate::error::{DomainError, DomainResult};

/// One-way hashing of secrets (passwords, one-time codes).
///
/// Implementations may be CPU-heavy; async callers should run them on a
/// blocking thread.
pub trait Hasher: Send + Sync {
    fn hash(&self, plain: &str) -> DomainResult<String>;

    fn verify(&self, plain: &str, hash: &str) -> DomainResult<bool>;
}

/// bcrypt with a fixed work factor.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub const DEFAULT_COST: u32 = 10;

    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COST)
    }
}

impl Hasher for BcryptHasher {
    fn hash(&self, plain: &str) -> DomainResult<String> {
        bcrypt::hash(plain, self.cost).map_err(|e| DomainError::hashing(e.to_string()))
    }

    fn verify(&self, plain: &str, hash: &str) -> DomainResult<bool> {
        bcrypt::verify(plain, hash).map_err(|e| DomainError::hashing(e.to_string()))
    }
}

/// Test double: `hash("x") == "hashed_x"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrefixHasher;

impl Hasher for PrefixHasher {
    fn hash(&self, plain: &str) -> DomainResult<String> {
        Ok(format!("hashed_{plain}"))
    }

    fn verify(&self, plain: &str, hash: &str) -> DomainResult<bool> {
        Ok(hash.strip_prefix("hashed_") == Some(plain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bcrypt_round_trips_and_rejects_wrong_secret() {
        // Minimum cost keeps the test fast.
        let hasher = BcryptHasher::new(4);
        let hash = hasher.hash("correct horse").unwrap();

        assert_ne!(hash, "correct horse");
        assert!(hasher.verify("correct horse", &hash).unwrap());
        assert!(!hasher.verify("battery staple", &hash).unwrap());
    }

    #[test]
    fn bcrypt_surfaces_malformed_hashes() {
        let err = BcryptHasher::new(4).verify("pw", "not-a-bcrypt-hash").unwrap_err();
        assert!(matches!(err, DomainError::Hashing(_)));
    }

    #[test]
    fn prefix_hasher_is_deterministic() {
        let hasher = PrefixHasher;
        assert_eq!(hasher.hash("secret").unwrap(), "hashed_secret");
        assert!(hasher.verify("secret", "hashed_secret").unwrap());
        assert!(!hasher.verify("secret", "hashed_other").unwrap());
    }
}
