//! PostgreSQL user repository.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{UserError, UserRepository};
use crate::models::user::{User, UserCredentials};

/// `users` table access over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_user((id, username, full_name): (i64, String, String)) -> User {
    User {
        id,
        username,
        full_name,
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, username, full_name FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(to_user))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, username, full_name FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(to_user))
    }

    async fn create(
        &self,
        username: &str,
        full_name: &str,
        password_hash: &str,
    ) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            "INSERT INTO users (username, full_name, password) VALUES ($1, $2, $3) \
             RETURNING id, username, full_name",
        )
        .bind(username)
        .bind(full_name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                UserError::UsernameAlreadyExists
            }
            other => UserError::Db(other),
        })?;
        Ok(to_user(row))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserError> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, username, password FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id, username, password_hash)| UserCredentials {
            id,
            username,
            password_hash,
        }))
    }

    async fn list(&self) -> Result<Vec<User>, UserError> {
        let rows = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, username, full_name FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(to_user).collect())
    }
}
