//! Authentication Models
//!
//! Data structures for authentication requests, responses, and stored users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Opaque user identifier assigned by the store
pub type UserId = Uuid;

// ============================================
// Stored Entities
// ============================================

/// User record as held by the store.
///
/// Deliberately not `Serialize`: the only way out to a client is
/// [`UserResponse`], which has no hash field.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Values needed to create a user; the store assigns `id` and `created_at`
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

// ============================================
// Request DTOs
// ============================================

/// Signup request. Every field is optional on the wire so that a missing
/// value is reported as such instead of as malformed JSON.
#[derive(Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(required, length(min = 1))]
    pub first_name: Option<String>,

    #[validate(required, length(min = 1))]
    pub last_name: Option<String>,

    #[validate(required, length(min = 1))]
    pub email: Option<String>,

    #[validate(required, length(min = 1))]
    pub password: Option<String>,

    pub phone: Option<String>,
}

/// Login request
#[derive(Clone, Default, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required, length(min = 1))]
    pub email: Option<String>,

    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

// ============================================
// Response DTOs
// ============================================

/// User response (public user data without sensitive fields)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
        }
    }
}

/// Signup/login response
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// `GET /me` response
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
}

// ============================================
// JWT Claims
// ============================================

/// JWT claims carried by bearer tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: UserId,
    /// User email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}
