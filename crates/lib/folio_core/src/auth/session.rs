//! Session service: the only place tokens are minted and sessions decided.
//!
//! Each user has at most one live refresh token. The store is keyed by the
//! user ID and holds the SHA-256 fingerprint of that token; issuing a new one
//! overwrites the old, so a rotated or superseded token stops resolving.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use super::AuthError;
use super::store::RefreshTokenStore;
use super::token::TokenCodec;
use crate::models::auth::{IssuedToken, SessionTokens, TokenPayload};
use crate::models::user::Principal;
use crate::users::{UserError, UserService};

/// Access token lifetime default: 15 minutes.
pub const DEFAULT_ACCESS_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// Refresh token lifetime default: 30 days.
pub const DEFAULT_REFRESH_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Token lifetimes.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
}

/// Longest lifetime accepted for either token: 365 days.
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

impl SessionConfig {
    /// Both lifetimes must be nonzero and at most [`MAX_TOKEN_TTL`].
    pub fn validate(&self) -> Result<(), AuthError> {
        for (name, ttl) in [
            ("access token", self.access_token_ttl),
            ("refresh token", self.refresh_token_ttl),
        ] {
            if ttl.is_zero() {
                return Err(AuthError::Internal(format!("{name} ttl must be nonzero")));
            }
            if ttl > MAX_TOKEN_TTL {
                return Err(AuthError::Internal(format!(
                    "{name} ttl {}s exceeds maximum of {}s",
                    ttl.as_secs(),
                    MAX_TOKEN_TTL.as_secs()
                )));
            }
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL,
            refresh_token_ttl: DEFAULT_REFRESH_TOKEN_TTL,
        }
    }
}

/// Store key for a user's refresh session.
fn identity(user_id: i64) -> String {
    user_id.to_string()
}

/// SHA-256 hash a refresh token for storage.
fn fingerprint(refresh_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(refresh_token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Composes the token codec, the refresh-token store and the user service.
#[derive(Clone)]
pub struct SessionService {
    codec: TokenCodec,
    store: Arc<dyn RefreshTokenStore>,
    users: UserService,
    config: SessionConfig,
}

impl SessionService {
    pub fn new(
        codec: TokenCodec,
        store: Arc<dyn RefreshTokenStore>,
        users: UserService,
        config: SessionConfig,
    ) -> Self {
        Self {
            codec,
            store,
            users,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Mint a signed access token for a user.
    pub fn create_access_token(
        &self,
        username: &str,
        user_id: i64,
        ttl: Duration,
    ) -> Result<IssuedToken, AuthError> {
        let payload = TokenPayload::new(username, user_id, ttl)?;
        let token = self.codec.issue(&payload)?;
        Ok(IssuedToken {
            token,
            expires_at: payload.expires_at,
        })
    }

    /// Start (or replace) the refresh session of the access token's user.
    ///
    /// An expired access token is accepted; a forged or malformed one is not.
    pub async fn create_refresh_token(
        &self,
        access_token: &str,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let payload = self.codec.decode_allow_expired(access_token)?;
        let refresh_token = Uuid::new_v4().to_string();
        self.store
            .put(&identity(payload.user_id), &fingerprint(&refresh_token), ttl)
            .await?;
        Ok(refresh_token)
    }

    /// Map a refresh token back to its user.
    ///
    /// Fails with [`AuthError::InvalidToken`] when the user has no session,
    /// the token is not the live one, or the user no longer exists.
    pub async fn resolve_refresh_token(
        &self,
        refresh_token: &str,
        identity_hint: i64,
    ) -> Result<Principal, AuthError> {
        let stored = self.store.get(&identity(identity_hint)).await?;
        if stored.as_deref() != Some(fingerprint(refresh_token).as_str()) {
            debug!(user_id = identity_hint, "refresh token does not match live session");
            return Err(AuthError::InvalidToken);
        }
        match self.users.get(identity_hint).await {
            Ok(user) => Ok(Principal {
                user_id: user.id,
                username: user.username,
            }),
            Err(UserError::NotFound) => Err(AuthError::InvalidToken),
            Err(e) => Err(e.into()),
        }
    }

    /// Authenticate with username + password and open a session.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionTokens, AuthError> {
        let principal = self.users.authenticate(username, password).await?;
        let tokens = self.issue_pair(&principal).await?;
        info!(user_id = principal.user_id, "session started");
        Ok(tokens)
    }

    /// Exchange a refresh token for a new token pair, rotating the refresh token.
    ///
    /// `access_token` is the client's last access token, expired or not; it
    /// identifies whose session to look up.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        access_token: &str,
    ) -> Result<SessionTokens, AuthError> {
        let hint = self.codec.decode_allow_expired(access_token)?.user_id;
        let principal = self.resolve_refresh_token(refresh_token, hint).await?;
        let tokens = self.issue_pair(&principal).await?;
        debug!(user_id = principal.user_id, "session refreshed");
        Ok(tokens)
    }

    /// Verify an access token presented on a protected request.
    pub fn verify(&self, access_token: &str) -> Result<TokenPayload, AuthError> {
        self.codec.parse(access_token)
    }

    /// End a user's session.
    pub async fn revoke(&self, user_id: i64) -> Result<(), AuthError> {
        self.store.delete(&identity(user_id)).await?;
        info!(user_id, "session revoked");
        Ok(())
    }

    async fn issue_pair(&self, principal: &Principal) -> Result<SessionTokens, AuthError> {
        let access = self.create_access_token(
            &principal.username,
            principal.user_id,
            self.config.access_token_ttl,
        )?;
        let refresh_token = self
            .create_refresh_token(&access.token, self.config.refresh_token_ttl)
            .await?;
        Ok(SessionTokens {
            access_token: access.token,
            refresh_token,
            expires_at: access.expires_at,
        })
    }
}
