//! User service: registration and credential checks over a [`UserRepository`].

use std::sync::Arc;

use tracing::info;

use super::password::{hash_password, verify_password};
use super::{UserError, UserRepository};
use crate::models::user::{Principal, User};

/// Owns password hashing; everything else is delegated to the repository.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Create a user with a bcrypt-hashed password.
    pub async fn register(
        &self,
        username: &str,
        full_name: &str,
        password: &str,
    ) -> Result<User, UserError> {
        if self.repo.find_by_username(username).await?.is_some() {
            return Err(UserError::UsernameAlreadyExists);
        }
        let password_hash = hash_password(password)?;
        let user = self.repo.create(username, full_name, &password_hash).await?;
        info!(user_id = user.id, username, "user registered");
        Ok(user)
    }

    /// Check a username/password pair.
    ///
    /// Unknown usernames and wrong passwords both yield
    /// [`UserError::InvalidCredentials`].
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, UserError> {
        let Some(credentials) = self.repo.find_credentials(username).await? else {
            return Err(UserError::InvalidCredentials);
        };
        if !verify_password(password, &credentials.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }
        Ok(Principal {
            user_id: credentials.id,
            username: credentials.username,
        })
    }

    pub async fn get(&self, id: i64) -> Result<User, UserError> {
        self.repo.find_by_id(id).await?.ok_or(UserError::NotFound)
    }

    pub async fn list(&self) -> Result<Vec<User>, UserError> {
        self.repo.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::MemoryUserRepository;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryUserRepository::new()))
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let users = service();
        let alice = users.register("alice", "Alice A", "password123").await.unwrap();
        let principal = users.authenticate("alice", "password123").await.unwrap();
        assert_eq!(principal.user_id, alice.id);
        assert_eq!(principal.username, "alice");
    }

    #[tokio::test]
    async fn register_rejects_taken_username() {
        let users = service();
        users.register("alice", "Alice A", "password123").await.unwrap();
        let err = users.register("alice", "Alice B", "password456").await.unwrap_err();
        assert!(matches!(err, UserError::UsernameAlreadyExists));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let users = service();
        users.register("alice", "Alice A", "password123").await.unwrap();
        assert!(matches!(
            users.authenticate("alice", "wrong-password").await,
            Err(UserError::InvalidCredentials)
        ));
        assert!(matches!(
            users.authenticate("ghost", "password123").await,
            Err(UserError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn get_missing_user_is_not_found() {
        assert!(matches!(service().get(99).await, Err(UserError::NotFound)));
    }
}
