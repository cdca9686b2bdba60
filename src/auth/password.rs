use std::sync::Arc;

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::PasswordConfig;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("invalid argon2 parameters: {0}")]
    Params(String),
    #[error("argon2 hash_password error: {0}")]
    Hashing(String),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
    #[error("password worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Argon2id hasher. Output is a PHC string carrying its own salt and cost,
/// so verification always uses the parameters the hash was created with.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash of a random secret under the configured cost. Verified against
    /// when there is no stored hash, so both login failures cost the same.
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    pub fn new(cfg: &PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        let mut hasher = Self {
            params,
            dummy_hash: Arc::from(""),
        };
        let secret = SaltString::generate(&mut OsRng);
        hasher.dummy_hash = hasher.hash(secret.as_str())?.into();
        Ok(hasher)
    }

    pub fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                PasswordError::Hashing(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
    pub fn verify(&self, hash: &str, plain: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            PasswordError::MalformedHash(e.to_string())
        })?;
        match self.argon2().verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
        }
    }

    /// Runs [`hash`](Self::hash) on the blocking pool.
    pub async fn hash_blocking(&self, plain: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain)).await?
    }

    /// Runs [`verify`](Self::verify) on the blocking pool.
    pub async fn verify_blocking(&self, hash: String, plain: String) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &plain)).await?
    }

    /// Burns one verification against the dummy hash. Always `false`.
    pub async fn verify_dummy_blocking(&self, plain: String) -> Result<bool, PasswordError> {
        self.verify_blocking(self.dummy_hash.to_string(), plain)
            .await
            .map(|_| false)
    }
}

#[cfg(test)]
pub(crate) fn cheap_hasher() -> PasswordHasher {
    PasswordHasher::new(&PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("cheap params are valid")
}
