//! Authentication and session logic.
//!
//! Provides the access-token codec, refresh-token storage and the session
//! service that composes them, shared by `folio_api` and the server binary.

pub mod redis_store;
pub mod secret;
pub mod session;
pub mod store;
pub mod token;

use thiserror::Error;

use crate::users::UserError;

pub use redis_store::RedisRefreshTokenStore;
pub use session::{SessionConfig, SessionService};
pub use store::{MemoryRefreshTokenStore, RefreshTokenStore};
pub use token::TokenCodec;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed, tampered, wrongly signed, or unknown token.
    #[error("token is invalid")]
    InvalidToken,

    /// Well-formed and correctly signed, but past its expiry.
    #[error("token has expired")]
    ExpiredToken,

    /// Errors owned by the user subsystem, passed through unchanged.
    #[error(transparent)]
    User(#[from] UserError),

    #[error("Internal error: {0}")]
    Internal(String),
}
