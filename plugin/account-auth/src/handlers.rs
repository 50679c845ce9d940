//! Authentication HTTP Handlers
//!
//! The dispatcher: parses requests, calls the [`AccountService`], and
//! renders its results. No authentication logic lives here.

use crate::error::{ApiError, LoginError, ProfileError, SignupError};
use crate::extractors::{AuthUser, JsonBody};
use crate::models::*;
use crate::service::AccountService;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Shared account service state
pub type AuthState = Arc<AccountService>;

// ============================================
// Route Builder
// ============================================

/// Create the service routes.
///
/// Unknown paths, and known paths with an unsupported method, answer
/// 404 `{"error": "Not found"}`.
pub fn create_routes(service: Arc<AccountService>) -> Router {
    Router::new()
        .route("/health", get(health).fallback(not_found))
        .route("/auth/signup", post(signup).fallback(not_found))
        .route("/auth/login", post(login).fallback(not_found))
        .route("/me", get(get_current_user).fallback(not_found))
        .fallback(not_found)
        .with_state(service)
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

/// POST /auth/signup
///
/// Register a new user account
pub async fn signup(
    State(auth): State<AuthState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> Result<impl IntoResponse, SignupError> {
    let response = auth.signup(req).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/login
///
/// Authenticate user and return a fresh token
pub async fn login(
    State(auth): State<AuthState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, LoginError> {
    let response = auth.login(req).await?;

    Ok(Json(response))
}

/// GET /me
///
/// Get current user profile
pub async fn get_current_user(
    State(auth): State<AuthState>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>, ProfileError> {
    let user = auth.profile(user.id).await?;

    Ok(Json(ProfileResponse { user }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::store::MemoryUserStore;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
    };
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        service: Arc<AccountService>,
        store: Arc<MemoryUserStore>,
    }

    impl TestApp {
        fn new() -> Self {
            let store = Arc::new(MemoryUserStore::new());
            let service = Arc::new(
                AccountService::new(store.clone(), &AuthConfig::for_tests("handler-secret"))
                    .unwrap(),
            );

            Self {
                router: create_routes(service.clone()),
                service,
                store,
            }
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, body)
        }

        async fn post(&self, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
            let request = Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
                .unwrap();
            self.send(request).await
        }

        async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            self.post(uri, body.to_string()).await
        }

        async fn me(&self, authorization: Option<&str>) -> (StatusCode, Value) {
            let mut request = Request::builder().method(Method::GET).uri("/me");
            if let Some(value) = authorization {
                request = request.header(header::AUTHORIZATION, value);
            }
            self.send(request.body(Body::empty()).unwrap()).await
        }
    }

    fn signup_body(email: &str, password: &str) -> Value {
        json!({ "firstName": "A", "lastName": "B", "email": email, "password": password })
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new();
        let request = Request::get("/health").body(Body::empty()).unwrap();

        assert_eq!(app.send(request).await, (StatusCode::OK, json!({ "ok": true })));
    }

    #[tokio::test]
    async fn test_signup_login_scenario() {
        let app = TestApp::new();

        let (status, body) = app.post_json("/auth/signup", signup_body("a@b.com", "secret1")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["email"], "a@b.com");
        assert!(!body["token"].as_str().unwrap().is_empty());

        let (status, body) = app.post_json("/auth/signup", signup_body("a@b.com", "secret1")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({ "error": "Email already exists" }));

        let (status, body) = app
            .post_json("/auth/login", json!({ "email": "A@B.com", "password": "secret1" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "a@b.com");

        let (status, body) = app
            .post_json("/auth/login", json!({ "email": "a@b.com", "password": "wrong" }))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Invalid credentials" }));
    }

    #[tokio::test]
    async fn test_signup_response_shape() {
        let app = TestApp::new();

        let mut request = signup_body("Shape@Example.com", "secret1");
        request["phone"] = json!("555-0100");
        let (status, body) = app.post_json("/auth/signup", request).await;
        assert_eq!(status, StatusCode::CREATED);

        let user = body["user"].as_object().unwrap();
        let mut keys: Vec<&str> = user.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["email", "firstName", "id", "lastName", "phone"]);
        assert_eq!(user["phone"], "555-0100");
        assert!(!body.to_string().contains("argon2"));
        assert!(!body.to_string().contains("secret1"));

        let claims = app.service.tokens().verify(body["token"].as_str().unwrap()).unwrap();
        assert_eq!(json!(claims.sub), body["user"]["id"]);
    }

    #[tokio::test]
    async fn test_signup_validation_errors() {
        let app = TestApp::new();

        let (status, body) = app
            .post_json("/auth/signup", json!({ "email": "a@b.com", "password": "secret1" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing required fields" }));

        let (status, body) = app.post_json("/auth/signup", signup_body("a@b", "secret1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid email" }));

        let (status, body) = app.post_json("/auth/signup", signup_body("a@b.com", "12345")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Password must be at least 6 characters" }));
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let app = TestApp::new();

        let (status, body) = app.post_json("/auth/login", json!({ "email": "a@b.com" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing email or password" }));

        let (status, body) = app.post("/auth/login", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing email or password" }));
    }

    #[tokio::test]
    async fn test_login_does_not_reveal_unknown_email() {
        let app = TestApp::new();
        app.post_json("/auth/signup", signup_body("a@b.com", "secret1")).await;

        let unknown = app
            .post_json("/auth/login", json!({ "email": "nobody@b.com", "password": "secret1" }))
            .await;
        let wrong = app
            .post_json("/auth/login", json!({ "email": "a@b.com", "password": "wrong-password" }))
            .await;

        assert_eq!(unknown, (StatusCode::UNAUTHORIZED, json!({ "error": "Invalid credentials" })));
        assert_eq!(unknown, wrong);
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let app = TestApp::new();

        for uri in ["/auth/signup", "/auth/login"] {
            let (status, body) = app.post(uri, "{\"email\": ").await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "error": "Invalid JSON" }));
        }
    }

    #[tokio::test]
    async fn test_me_outcomes() {
        let app = TestApp::new();
        let (_, body) = app.post_json("/auth/signup", signup_body("me@b.com", "secret1")).await;
        let token = body["token"].as_str().unwrap().to_string();
        let user_id: UserId = serde_json::from_value(body["user"]["id"].clone()).unwrap();

        let unauthorized = (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" }));
        assert_eq!(app.me(None).await, unauthorized);
        assert_eq!(app.me(Some(token.as_str())).await, unauthorized);
        assert_eq!(app.me(Some("Bearer not-a-token")).await, unauthorized);

        let expired = app
            .service
            .tokens()
            .issue_at(user_id, "me@b.com", Utc::now() - Duration::days(8))
            .unwrap();
        assert_eq!(app.me(Some(&*format!("Bearer {expired}"))).await, unauthorized);

        let (status, body) = app.me(Some(&*format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "me@b.com");
        assert_eq!(body["user"].as_object().unwrap().len(), 5);

        app.store.remove_user(user_id).await;
        assert_eq!(
            app.me(Some(&*format!("Bearer {token}"))).await,
            (StatusCode::NOT_FOUND, json!({ "error": "Not found" }))
        );
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_signups() {
        let app = TestApp::new();

        let (first, second) = tokio::join!(
            app.post_json("/auth/signup", signup_body("dup@example.com", "secret1")),
            app.post_json("/auth/signup", signup_body("Dup@Example.com", "secret1")),
        );

        let mut statuses = [first.0, second.0];
        statuses.sort_unstable();
        assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
        assert_eq!(app.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unmatched_routes() {
        let app = TestApp::new();
        let not_found = (StatusCode::NOT_FOUND, json!({ "error": "Not found" }));

        let request = Request::get("/nope").body(Body::empty()).unwrap();
        assert_eq!(app.send(request).await, not_found);

        let request = Request::get("/auth/signup").body(Body::empty()).unwrap();
        assert_eq!(app.send(request).await, not_found);

        let (status, _) = app.post("/me", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
