//! Authentication Error Types
//!
//! Client-facing errors render as `{"error": "<message>"}` with the status
//! their category maps to. Internal failures are logged where they are
//! converted and reach the client only as "Server error".

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Signup failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignupError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Password must be at least {min_length} characters")]
    WeakPassword { min_length: usize },

    #[error("Email already exists")]
    EmailExists,

    #[error("Server error")]
    Internal,
}

impl IntoResponse for SignupError {
    fn into_response(self) -> Response {
        let status = match &self {
            SignupError::MissingFields
            | SignupError::InvalidEmail
            | SignupError::WeakPassword { .. } => StatusCode::BAD_REQUEST,
            SignupError::EmailExists => StatusCode::CONFLICT,
            SignupError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error_response(status, self.to_string())
    }
}

impl From<StoreError> for SignupError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmailTaken => SignupError::EmailExists,
            other => {
                tracing::error!("Signup store failure: {:?}", other);
                SignupError::Internal
            }
        }
    }
}

impl From<HashingError> for SignupError {
    fn from(err: HashingError) -> Self {
        tracing::error!("Signup hashing failure: {:?}", err);
        SignupError::Internal
    }
}

impl From<TokenError> for SignupError {
    fn from(err: TokenError) -> Self {
        tracing::error!("Signup token issuance failure: {:?}", err);
        SignupError::Internal
    }
}

/// Login failures
///
/// Unknown email and wrong password both surface as `InvalidCredentials`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("Missing email or password")]
    MissingFields,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Server error")]
    Internal,
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        let status = match &self {
            LoginError::MissingFields => StatusCode::BAD_REQUEST,
            LoginError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            LoginError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error_response(status, self.to_string())
    }
}

impl From<StoreError> for LoginError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Login store failure: {:?}", err);
        LoginError::Internal
    }
}

impl From<HashingError> for LoginError {
    fn from(err: HashingError) -> Self {
        tracing::error!("Login verification failure: {:?}", err);
        LoginError::Internal
    }
}

impl From<TokenError> for LoginError {
    fn from(err: TokenError) -> Self {
        tracing::error!("Login token issuance failure: {:?}", err);
        LoginError::Internal
    }
}

/// Profile lookup failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("Not found")]
    NotFound,

    #[error("Server error")]
    Internal,
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProfileError::NotFound => StatusCode::NOT_FOUND,
            ProfileError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error_response(status, self.to_string())
    }
}

impl From<StoreError> for ProfileError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Profile store failure: {:?}", err);
        ProfileError::Internal
    }
}

/// Dispatcher-level failures that happen before any service call
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidJson => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        };

        error_response(status, self.to_string())
    }
}

/// Token issuance and verification errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed, tampered with, or signed with another key")]
    Invalid,

    #[error("token has expired")]
    Expired,

    #[error("token signing secret is not configured")]
    Unconfigured,

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => {
                tracing::debug!("JWT error: {:?}", err);
                TokenError::Invalid
            }
        }
    }
}

/// Password hashing failure (entropy or resource exhaustion)
#[derive(Debug, Clone, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct HashingError(pub String);

impl From<argon2::password_hash::Error> for HashingError {
    fn from(err: argon2::password_hash::Error) -> Self {
        HashingError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for HashingError {
    fn from(err: tokio::task::JoinError) -> Self {
        HashingError(format!("hashing worker stopped: {err}"))
    }
}

/// User store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    EmailTaken,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("configuration error: {0}")]
    Invalid(String),
}
