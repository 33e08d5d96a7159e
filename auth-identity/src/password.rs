//! Password hashing
//!
//! Argon2id with memory 19 MiB, two iterations and a single lane by
//! default. Hashing and verification are CPU bound and run on the blocking
//! pool so they never stall the async runtime.

use crate::{config::IdentityConfig, error::*};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use rand::rngs::OsRng;
use tracing::warn;

/// Output length of the derived key in bytes
const HASH_OUTPUT_LEN: usize = 32;

#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a self-describing PHC string with a fresh random salt
    async fn hash(&self, password: &str) -> Result<String>;

    /// Check a password against a stored PHC string.
    ///
    /// Returns false for a wrong password and for a digest that cannot be parsed.
    async fn verify(&self, password: &str, hash: &str) -> bool;
}

#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new(config: &IdentityConfig) -> Result<Self> {
        Self::with_params(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
        )
    }

    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, Some(HASH_OUTPUT_LEN))
            .map_err(|e| IdentityError::HashingError(format!("Invalid Argon2 params: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let argon2 = self.argon2.clone();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| IdentityError::HashingError(format!("Failed to hash password: {e}")))
        })
        .await
        .map_err(|e| IdentityError::HashingError(format!("Hashing task failed: {e}")))?
    }

    async fn verify(&self, password: &str, hash: &str) -> bool {
        let password = password.to_string();
        let hash = hash.to_string();
        let argon2 = self.argon2.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            let parsed = match PasswordHash::new(&hash) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(error = %e, "Stored password hash is malformed");
                    return false;
                }
            };

            match argon2.verify_password(password.as_bytes(), &parsed) {
                Ok(()) => true,
                Err(argon2::password_hash::Error::Password) => false,
                Err(e) => {
                    warn!(error = %e, "Password verification error");
                    false
                }
            }
        })
        .await;

        outcome.unwrap_or_else(|e| {
            warn!(error = %e, "Verification task failed");
            false
        })
    }
}
