//! Token Issuer/Verifier
//!
//! HS256 bearer tokens binding a user id and email. Tokens are stateless: one
//! is valid while its signature checks out and `exp` has not passed. There is
//! no server-side revocation.

use crate::config::AuthConfig;
use crate::error::TokenError;
use crate::models::{Claims, UserId};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

#[derive(Clone)]
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies bearer tokens with the process-wide secret.
///
/// With an empty secret no keys exist and every call fails with
/// [`TokenError::Unconfigured`].
#[derive(Clone)]
pub struct TokenIssuer {
    keys: Option<SigningKeys>,
    lifetime: Duration,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let keys = if config.jwt_secret.is_empty() {
            tracing::warn!("JWT_SECRET is not set. Auth will fail.");
            None
        } else {
            Some(SigningKeys {
                encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            })
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            keys,
            lifetime: config.token_lifetime,
            validation,
        }
    }

    /// Whether a signing secret is present
    pub fn is_configured(&self) -> bool {
        self.keys.is_some()
    }

    /// Issue a token for a user, expiring one lifetime from now
    pub fn issue(&self, subject: UserId, email: &str) -> Result<String, TokenError> {
        self.issue_at(subject, email, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        subject: UserId,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let keys = self.keys.as_ref().ok_or(TokenError::Unconfigured)?;

        let expires_at = issued_at
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| TokenError::Signing("token expiry is out of range".to_string()))?;

        let claims = Claims {
            sub: subject,
            email: email.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let keys = self.keys.as_ref().ok_or(TokenError::Unconfigured)?;

        let token_data = decode::<Claims>(token, &keys.decoding, &self.validation)?;

        Ok(token_data.claims)
    }
}
