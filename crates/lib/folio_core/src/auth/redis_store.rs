//! Redis-backed refresh-session store.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::time::timeout;
use tracing::{info, warn};

use super::AuthError;
use super::store::RefreshTokenStore;

/// Key namespace for refresh sessions.
const KEY_PREFIX: &str = "refresh_token";

/// Default bound on a single store round-trip.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(2);

/// Refresh-session store on a shared, auto-reconnecting Redis connection.
///
/// Expiry is delegated to Redis (`SET .. EX`). Every command is bounded by
/// `op_timeout`; a timeout or transport failure is reported as
/// [`AuthError::Internal`], never as an absent session.
#[derive(Clone)]
pub struct RedisRefreshTokenStore {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisRefreshTokenStore {
    /// Connect to `url` (e.g. `redis://127.0.0.1:6379/0`).
    pub async fn connect(url: &str, op_timeout: Duration) -> Result<Self, AuthError> {
        let client = redis::Client::open(url)
            .map_err(|e| AuthError::Internal(format!("redis client: {e}")))?;
        let conn = match timeout(op_timeout, ConnectionManager::new(client)).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(AuthError::Internal(format!("redis connect: {e}"))),
            Err(_) => return Err(AuthError::Internal("redis connect: timed out".into())),
        };
        info!("connected to redis");
        Ok(Self { conn, op_timeout })
    }

    /// Round-trip a `PING`.
    pub async fn ping(&self) -> Result<(), AuthError> {
        let mut conn = self.conn.clone();
        self.bounded("ping", async move {
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<(), redis::RedisError>(())
        })
        .await
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, AuthError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(op, error = %e, "refresh token store command failed");
                Err(AuthError::Internal(format!("redis {op}: {e}")))
            }
            Err(_) => {
                warn!(
                    op,
                    timeout_ms = self.op_timeout.as_millis() as u64,
                    "refresh token store command timed out"
                );
                Err(AuthError::Internal(format!("redis {op}: timed out")))
            }
        }
    }
}

/// Redis key for an identity.
fn session_key(identity: &str) -> String {
    format!("{KEY_PREFIX}:{identity}")
}

/// TTL in whole seconds, rounded up, never zero (`EX 0` is rejected by Redis).
fn ttl_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

#[async_trait]
impl RefreshTokenStore for RedisRefreshTokenStore {
    async fn put(
        &self,
        identity: &str,
        refresh_token: &str,
        ttl: Duration,
    ) -> Result<(), AuthError> {
        let mut conn = self.conn.clone();
        let key = session_key(identity);
        let secs = ttl_secs(ttl);
        self.bounded("set", async move {
            let _: () = conn.set_ex(key, refresh_token, secs).await?;
            Ok::<(), redis::RedisError>(())
        })
        .await
    }

    async fn get(&self, identity: &str) -> Result<Option<String>, AuthError> {
        let mut conn = self.conn.clone();
        let key = session_key(identity);
        self.bounded("get", async move { conn.get(key).await }).await
    }

    async fn delete(&self, identity: &str) -> Result<(), AuthError> {
        let mut conn = self.conn.clone();
        let key = session_key(identity);
        self.bounded("del", async move {
            let _: () = conn.del(key).await?;
            Ok::<(), redis::RedisError>(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_by_identity() {
        assert_eq!(session_key("42"), "refresh_token:42");
    }

    #[test]
    fn ttl_rounds_up_to_whole_seconds() {
        assert_eq!(ttl_secs(Duration::from_secs(900)), 900);
        assert_eq!(ttl_secs(Duration::from_millis(1500)), 2);
        assert_eq!(ttl_secs(Duration::ZERO), 1);
    }

    #[tokio::test]
    async fn connect_rejects_malformed_url() {
        let err = RedisRefreshTokenStore::connect("not a url", DEFAULT_OP_TIMEOUT)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AuthError::Internal(_)));
    }
}
