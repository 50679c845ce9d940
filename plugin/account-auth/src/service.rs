//! Account Service
//!
//! Signup, login and profile lookup on top of the credential hasher, the token
//! issuer and a [`UserStore`]. The service keeps no per-request state; the
//! only shared values are read-only after construction.

use crate::config::AuthConfig;
use crate::error::{ConfigError, HashingError, LoginError, ProfileError, SignupError};
use crate::hasher::{CredentialHasher, HashedCredential};
use crate::models::*;
use crate::store::UserStore;
use crate::token::TokenIssuer;

use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use validator::Validate;

lazy_static! {
    /// local@domain.tld, with no whitespace and a single `@`
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles");
}

/// Check the `local@domain.tld` shape required at signup
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Account service
pub struct AccountService {
    store: Arc<dyn UserStore>,
    hasher: CredentialHasher,
    tokens: TokenIssuer,
    min_password_length: usize,
}

impl AccountService {
    /// Create a new account service
    pub fn new(store: Arc<dyn UserStore>, config: &AuthConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            store,
            hasher: CredentialHasher::new(config)?,
            tokens: TokenIssuer::new(config),
            min_password_length: config.min_password_length,
        })
    }

    /// Get reference to the token issuer
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    // ============================================
    // Password Hashing
    // ============================================

    async fn hash_password(&self, password: String) -> Result<HashedCredential, HashingError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, HashingError> {
        let hasher = self.hasher.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await?)
    }

    // ============================================
    // Signup
    // ============================================

    /// Register a new user and issue their first token
    pub async fn signup(&self, req: SignupRequest) -> Result<AuthResponse, SignupError> {
        req.validate().map_err(|_| SignupError::MissingFields)?;

        let email = req.email.unwrap_or_default();
        let password = req.password.unwrap_or_default();

        if !is_valid_email(&email) {
            return Err(SignupError::InvalidEmail);
        }

        if password.chars().count() < self.min_password_length {
            return Err(SignupError::WeakPassword {
                min_length: self.min_password_length,
            });
        }

        // Refuse before persisting, so an unusable secret leaves no orphaned account
        if !self.tokens.is_configured() {
            tracing::error!("Signup rejected: token signing secret is not configured");
            return Err(SignupError::Internal);
        }

        let password_hash = self.hash_password(password).await?;

        let user = self
            .store
            .create_user(NewUser {
                email: email.to_lowercase(),
                password_hash,
                first_name: req.first_name.unwrap_or_default(),
                last_name: req.last_name.unwrap_or_default(),
                phone: req.phone,
            })
            .await?;

        let token = self.tokens.issue(user.id, &user.email)?;

        tracing::info!(user_id = %user.id, "User signed up");

        Ok(AuthResponse {
            user: UserResponse::from(user),
            token,
        })
    }

    // ============================================
    // Login
    // ============================================

    /// Authenticate a user by email and password
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, LoginError> {
        req.validate().map_err(|_| LoginError::MissingFields)?;

        let email = req.email.unwrap_or_default().to_lowercase();
        let password = req.password.unwrap_or_default();

        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(LoginError::InvalidCredentials)?;

        if !self
            .verify_password(password, user.password_hash.clone())
            .await?
        {
            tracing::debug!(user_id = %user.id, "Login rejected: password mismatch");
            return Err(LoginError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, &user.email)?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthResponse {
            user: UserResponse::from(user),
            token,
        })
    }

    // ============================================
    // User Profile
    // ============================================

    /// Look up the sanitized record for an authenticated user
    pub async fn profile(&self, user_id: UserId) -> Result<UserResponse, ProfileError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(ProfileError::NotFound)?;

        Ok(UserResponse::from(user))
    }
}
