//! User subsystem: repository contract, backends, and the user service.

pub mod memory;
pub mod password;
pub mod postgres;
pub mod service;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::user::{User, UserCredentials};

pub use memory::MemoryUserRepository;
pub use postgres::PgUserRepository;
pub use service::UserService;

/// User subsystem errors.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,

    #[error("username is already taken")]
    UsernameAlreadyExists,

    #[error("wrong username/password")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Persistence for user rows.
///
/// Lookups return `Ok(None)` for a missing row; `Err` is reserved for
/// storage failures.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError>;

    /// Insert a user. Fails with [`UserError::UsernameAlreadyExists`] on a
    /// duplicate username.
    async fn create(
        &self,
        username: &str,
        full_name: &str,
        password_hash: &str,
    ) -> Result<User, UserError>;

    async fn find_credentials(&self, username: &str)
    -> Result<Option<UserCredentials>, UserError>;

    async fn list(&self) -> Result<Vec<User>, UserError>;
}
