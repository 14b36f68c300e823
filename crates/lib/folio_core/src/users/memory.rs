//! In-process user repository for tests and local development.

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use super::{UserError, UserRepository};
use crate::models::user::{User, UserCredentials};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// Users held in a `Vec` behind a mutex. IDs are assigned sequentially from 1
/// and never reused.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<StoredUser>>,
    last_id: AtomicI64,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_users<T>(&self, f: impl FnOnce(&mut Vec<StoredUser>) -> T) -> Result<T, UserError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| UserError::Internal("user table lock poisoned".into()))?;
        Ok(f(&mut users))
    }

    /// Drop a user row, as if deleted out of band.
    pub fn remove(&self, id: i64) -> Result<(), UserError> {
        self.with_users(|users| users.retain(|u| u.user.id != id))
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        self.with_users(|users| {
            users
                .iter()
                .find(|u| u.user.username == username)
                .map(|u| u.user.clone())
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        self.with_users(|users| {
            users
                .iter()
                .find(|u| u.user.id == id)
                .map(|u| u.user.clone())
        })
    }

    async fn create(
        &self,
        username: &str,
        full_name: &str,
        password_hash: &str,
    ) -> Result<User, UserError> {
        self.with_users(|users| {
            if users.iter().any(|u| u.user.username == username) {
                return Err(UserError::UsernameAlreadyExists);
            }
            let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
            let user = User {
                id,
                username: username.to_string(),
                full_name: full_name.to_string(),
            };
            users.push(StoredUser {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            });
            Ok(user)
        })?
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserError> {
        self.with_users(|users| {
            users
                .iter()
                .find(|u| u.user.username == username)
                .map(|u| UserCredentials {
                    id: u.user.id,
                    username: u.user.username.clone(),
                    password_hash: u.password_hash.clone(),
                })
        })
    }

    async fn list(&self) -> Result<Vec<User>, UserError> {
        self.with_users(|users| users.iter().map(|u| u.user.clone()).collect())
    }
}
