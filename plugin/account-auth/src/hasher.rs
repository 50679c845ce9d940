//! Credential Hasher
//!
//! Argon2id password hashing. Each hash is a PHC string carrying its own
//! random salt and cost parameters, so verification reads the parameters from
//! the stored hash rather than from the current config.

use crate::config::AuthConfig;
use crate::error::{ConfigError, HashingError};

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

/// Stored form of a password: an Argon2id PHC string
pub type HashedCredential = String;

/// Password hasher holding the configured Argon2 cost
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    /// Create a hasher from the configured Argon2 parameters
    pub fn new(config: &AuthConfig) -> Result<Self, ConfigError> {
        let params = Params::new(
            config.argon2_memory_cost,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| ConfigError::Invalid(format!("ARGON2_* parameters rejected: {e}")))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, plaintext: &str) -> Result<HashedCredential, HashingError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)?
            .to_string();

        Ok(hash)
    }

    /// Verify a password against a stored hash.
    ///
    /// A malformed hash verifies as `false`.
    pub fn verify(&self, plaintext: &str, hashed: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hashed) else {
            return false;
        };

        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }
}
