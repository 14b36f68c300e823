//! Refresh-session storage contract and an in-process backend.
//!
//! A store maps a user identity (the string form of the user ID) to the
//! fingerprint of that user's single live refresh token. Writing a new value
//! replaces the old one, which is what invalidates a rotated token.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use super::AuthError;

/// TTL-bounded key-value persistence for refresh sessions.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Set the session for `identity`, replacing any previous one.
    async fn put(&self, identity: &str, refresh_token: &str, ttl: Duration)
    -> Result<(), AuthError>;

    /// Current session value, or `None` when absent or expired.
    async fn get(&self, identity: &str) -> Result<Option<String>, AuthError>;

    /// Remove the session. Deleting a missing key is not an error.
    async fn delete(&self, identity: &str) -> Result<(), AuthError>;
}

#[derive(Debug)]
struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

/// In-memory store for tests and single-process development.
///
/// Expired entries are dropped lazily on read.
#[derive(Debug, Default)]
pub struct MemoryRefreshTokenStore {
    entries: DashMap<String, MemoryEntry>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn put(
        &self,
        identity: &str,
        refresh_token: &str,
        ttl: Duration,
    ) -> Result<(), AuthError> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| AuthError::Internal(format!("session ttl out of range: {ttl:?}")))?;
        self.entries.insert(
            identity.to_string(),
            MemoryEntry {
                value: refresh_token.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, identity: &str) -> Result<Option<String>, AuthError> {
        let expired = match self.entries.get(identity) {
            Some(entry) if Instant::now() < entry.expires_at => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries
                .remove_if(identity, |_, entry| Instant::now() >= entry.expires_at);
        }
        Ok(None)
    }

    async fn delete(&self, identity: &str) -> Result<(), AuthError> {
        self.entries.remove(identity);
        Ok(())
    }
}
