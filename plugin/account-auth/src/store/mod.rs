//! User Store
//!
//! The persistence seam of the service. The store owns user records and
//! enforces email uniqueness; a violation comes back as
//! [`StoreError::EmailTaken`] rather than a backend-specific error.

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

use crate::error::StoreError;
use crate::models::{NewUser, User, UserId};

use async_trait::async_trait;

/// Persistence operations required by the account service
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user. Fails with `EmailTaken` if the lowercased email exists.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Find a user by email, compared case-insensitively
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Find a user by id
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
}
