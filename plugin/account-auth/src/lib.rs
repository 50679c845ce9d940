//! Account Authentication
//!
//! Email/password accounts with stateless bearer tokens:
//! - User registration and login
//! - HS256 token issue and verification
//! - Argon2id password hashing
//! - Pluggable user storage (in-memory or PostgreSQL)
//!
//! # Configuration
//!
//! [`AuthConfig::from_env`] reads:
//! - `JWT_SECRET` - Secret key for signing tokens (empty disables issuing and verification)
//! - `JWT_EXPIRES_IN` - Token lifetime, e.g. `7d`, `12h`, `30m` (default: `7d`)
//! - `ARGON2_MEMORY_COST`, `ARGON2_TIME_COST`, `ARGON2_PARALLELISM` - Hashing cost
//! - `MIN_PASSWORD_LENGTH` - Minimum password length in characters (default: 6)
//!
//! # Usage
//!
//! ```rust,ignore
//! use account_auth::{create_routes, AccountService, AuthConfig, MemoryUserStore};
//!
//! let config = AuthConfig::from_env()?;
//! let service = AccountService::new(Arc::new(MemoryUserStore::new()), &config)?;
//! let app = create_routes(Arc::new(service));
//! ```

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod hasher;
pub mod models;
pub mod service;
pub mod store;
pub mod token;

// Re-export commonly used types
pub use config::AuthConfig;
pub use error::{
    ApiError, ConfigError, HashingError, LoginError, ProfileError, SignupError, StoreError,
    TokenError,
};
pub use extractors::{authenticate, AuthUser, JsonBody};
pub use handlers::{create_routes, AuthState};
pub use hasher::CredentialHasher;
pub use models::*;
pub use service::AccountService;
pub use store::{MemoryUserStore, PgUserStore, UserStore};
pub use token::TokenIssuer;
