//! Token and session models.

use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthError;

/// Claims carried by a signed access token.
///
/// Timestamps are kept at whole-second precision, matching the `iat`/`exp`
/// encoding, so a decoded payload compares equal to the one that was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Random token identifier (`jti`).
    #[serde(rename = "jti")]
    pub id: Uuid,
    pub username: String,
    pub user_id: i64,
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl TokenPayload {
    /// Build a fresh payload valid for `ttl` from now.
    ///
    /// The lifetime is rounded up to whole seconds; a zero `ttl` is rejected.
    pub fn new(username: &str, user_id: i64, ttl: Duration) -> Result<Self, AuthError> {
        if ttl.is_zero() {
            return Err(AuthError::Internal("token ttl must be nonzero".to_string()));
        }
        let issued_at = Utc::now().trunc_subsecs(0);
        let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
        let expires_at = i64::try_from(secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .ok_or_else(|| AuthError::Internal(format!("token ttl out of range: {ttl:?}")))?;
        Ok(Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            user_id,
            issued_at,
            expires_at,
        })
    }

    /// A payload is valid only strictly before its expiry.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), AuthError> {
        if now >= self.expires_at {
            return Err(AuthError::ExpiredToken);
        }
        Ok(())
    }
}

/// A freshly signed access token together with its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Token pair handed to a client on login or refresh.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry of `access_token`.
    pub expires_at: DateTime<Utc>,
}
