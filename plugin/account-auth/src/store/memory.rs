//! In-memory user store, used when no database is configured and in tests.

use super::UserStore;
use crate::error::StoreError;
use crate::models::{NewUser, User, UserId};

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    /// lowercased email -> id
    by_email: HashMap<String, UserId>,
}

/// User store backed by process memory
#[derive(Default)]
pub struct MemoryUserStore {
    tables: RwLock<Tables>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete a user, returning the removed record
    pub async fn remove_user(&self, id: UserId) -> Option<User> {
        let mut tables = self.tables.write().await;
        let user = tables.users.remove(&id)?;
        tables.by_email.remove(&user.email.to_lowercase());
        Some(user)
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let key = new_user.email.to_lowercase();

        // Uniqueness check and insert happen under the same write guard
        let mut tables = self.tables.write().await;
        if tables.by_email.contains_key(&key) {
            return Err(StoreError::EmailTaken);
        }

        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            phone: new_user.phone,
            created_at: Utc::now(),
        };

        tables.by_email.insert(key, user.id);
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;

        Ok(tables
            .by_email
            .get(&email.to_lowercase())
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }
}
