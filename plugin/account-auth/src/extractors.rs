//! Authentication Extractors
//!
//! Bearer-token authentication and the JSON body extractor used by the
//! signup/login handlers.

use crate::error::ApiError;
use crate::handlers::AuthState;
use crate::models::UserId;
use crate::token::TokenIssuer;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
};
use serde::de::DeserializeOwned;

/// Authorization scheme prefix, matched case-sensitively
pub const BEARER_PREFIX: &str = "Bearer ";

/// Resolve an `Authorization` header value to a user id.
///
/// Absent header, wrong scheme, and any verification failure all give `None`;
/// callers only learn "unauthenticated".
pub fn authenticate(tokens: &TokenIssuer, authorization: Option<&str>) -> Option<UserId> {
    let token = authorization?.strip_prefix(BEARER_PREFIX)?;

    match tokens.verify(token) {
        Ok(claims) => Some(claims.sub),
        Err(e) => {
            tracing::debug!("Bearer token rejected: {}", e);
            None
        }
    }
}

/// Authenticated user resolved from the bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
}

#[async_trait]
impl FromRequestParts<AuthState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AuthState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        authenticate(state.tokens(), auth_header)
            .map(|id| AuthUser { id })
            .ok_or(ApiError::Unauthorized)
    }
}

/// JSON request body.
///
/// Reads the body whatever the Content-Type. An empty body yields
/// `T::default()`; anything that does not deserialize into `T` is rejected
/// as invalid JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::debug!("Request body unreadable: {}", e);
            ApiError::InvalidJson
        })?;

        if bytes.is_empty() {
            return Ok(JsonBody(T::default()));
        }

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            tracing::debug!("Request body is not valid JSON: {}", e);
            ApiError::InvalidJson
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::models::LoginRequest;
    use axum::body::Body;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn tokens() -> TokenIssuer {
        TokenIssuer::new(&AuthConfig::with_secret("extractor-secret"))
    }

    #[test]
    fn test_authenticate_valid_bearer() {
        let tokens = tokens();
        let user_id = Uuid::new_v4();
        let header = format!("Bearer {}", tokens.issue(user_id, "a@b.com").unwrap());

        assert_eq!(authenticate(&tokens, Some(header.as_str())), Some(user_id));
    }

    #[test]
    fn test_authenticate_rejects_everything_else() {
        let tokens = tokens();
        let token = tokens.issue(Uuid::new_v4(), "a@b.com").unwrap();
        let expired = tokens
            .issue_at(Uuid::new_v4(), "a@b.com", Utc::now() - Duration::days(30))
            .unwrap();

        assert_eq!(authenticate(&tokens, None), None);
        assert_eq!(authenticate(&tokens, Some("")), None);
        assert_eq!(authenticate(&tokens, Some(token.as_str())), None);
        assert_eq!(authenticate(&tokens, Some(&*format!("bearer {token}"))), None);
        assert_eq!(authenticate(&tokens, Some(&*format!("Token {token}"))), None);
        assert_eq!(authenticate(&tokens, Some("Bearer garbage")), None);
        assert_eq!(authenticate(&tokens, Some(&*format!("Bearer {expired}"))), None);
    }

    #[test]
    fn test_authenticate_with_unconfigured_issuer() {
        let token = tokens().issue(Uuid::new_v4(), "a@b.com").unwrap();
        let unconfigured = TokenIssuer::new(&AuthConfig::default());

        assert_eq!(authenticate(&unconfigured, Some(&*format!("Bearer {token}"))), None);
    }

    async fn extract(body: &'static str) -> Result<LoginRequest, ApiError> {
        let req = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .body(Body::from(body))
            .unwrap();

        JsonBody::<LoginRequest>::from_request(req, &()).await.map(|JsonBody(body)| body)
    }

    #[tokio::test]
    async fn test_json_body_without_content_type() {
        let req = extract(r#"{"email":"a@b.com","password":"secret1"}"#).await.unwrap();
        assert_eq!(req.email.as_deref(), Some("a@b.com"));
    }

    #[tokio::test]
    async fn test_json_body_empty_is_default() {
        let req = extract("").await.unwrap();
        assert!(req.email.is_none());
        assert!(req.password.is_none());
    }

    #[tokio::test]
    async fn test_json_body_malformed() {
        assert_eq!(extract("{not json").await.err(), Some(ApiError::InvalidJson));
        assert_eq!(extract("null").await.err(), Some(ApiError::InvalidJson));
        assert_eq!(extract(r#"{"email": 42}"#).await.err(), Some(ApiError::InvalidJson));
    }
}
