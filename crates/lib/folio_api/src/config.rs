//! API server configuration.

use std::time::Duration;

use folio_core::auth::{AuthError, SessionConfig};
use folio_core::auth::redis_store::DEFAULT_OP_TIMEOUT;
use folio_core::auth::secret::resolve_jwt_secret;
use folio_core::auth::session::{DEFAULT_ACCESS_TOKEN_TTL, DEFAULT_REFRESH_TOKEN_TTL};

/// Configuration for the API server. Immutable once loaded.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL for refresh sessions.
    pub redis_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Access token lifetime.
    pub access_token_ttl: Duration,
    /// Refresh token lifetime.
    pub refresh_token_ttl: Duration,
    /// Bound on each refresh-session store round-trip.
    pub store_timeout: Duration,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                     | Default                                |
    /// |------------------------------|----------------------------------------|
    /// | `BIND_ADDR`                  | `127.0.0.1:8080`                       |
    /// | `DATABASE_URL`               | `postgres://localhost:5432/folio`      |
    /// | `REDIS_URL`                  | `redis://127.0.0.1:6379/0`             |
    /// | `JWT_SECRET` / `AUTH_SECRET` | generated & persisted to file          |
    /// | `JWT_ACCESS_TOKEN_TTL_SECS`  | `900`                                  |
    /// | `JWT_REFRESH_TOKEN_TTL_SECS` | `2592000`                              |
    /// | `STORE_TIMEOUT_MS`           | `2000`                                 |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/folio".into()),
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379/0".into()),
            jwt_secret: resolve_jwt_secret(),
            access_token_ttl: env_secs("JWT_ACCESS_TOKEN_TTL_SECS")
                .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL),
            refresh_token_ttl: env_secs("JWT_REFRESH_TOKEN_TTL_SECS")
                .unwrap_or(DEFAULT_REFRESH_TOKEN_TTL),
            store_timeout: std::env::var("STORE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_OP_TIMEOUT),
        }
    }

    /// Rejects lifetimes and timeouts the services cannot honour.
    pub fn validate(&self) -> Result<(), AuthError> {
        self.session_config().validate()?;
        if self.store_timeout.is_zero() {
            return Err(AuthError::Internal("store timeout must be nonzero".to_string()));
        }
        Ok(())
    }

    /// Token lifetimes for the session service.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            access_token_ttl: self.access_token_ttl,
            refresh_token_ttl: self.refresh_token_ttl,
        }
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}
