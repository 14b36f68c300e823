//! Authentication middleware: Bearer token extraction and access-token verification.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use folio_core::auth::AuthError;
use folio_core::models::auth::TokenPayload;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;

/// Accepted authorization scheme, compared case-insensitively.
pub const BEARER_SCHEME: &str = "bearer";

/// Verified token payload, stored in request extensions by [`require_auth`].
///
/// Handlers behind the gate take it as an extractor argument.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub TokenPayload);

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Internal("authenticated user missing from request".into()))
    }
}

/// Pull the credential out of `Authorization: <scheme> <credential>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = match headers.get(AUTHORIZATION) {
        None => return Err(unauthorized("authorization header is not provided")),
        Some(value) if value.is_empty() => {
            return Err(unauthorized("authorization header is not provided"));
        }
        Some(value) => value
            .to_str()
            .map_err(|_| unauthorized("invalid authorization header format"))?,
    };

    let mut fields = header.split_whitespace();
    let (Some(scheme), Some(credential)) = (fields.next(), fields.next()) else {
        return Err(unauthorized("invalid authorization header format"));
    };

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(unauthorized(&format!(
            "unsupported authorization type {}",
            scheme.to_ascii_lowercase()
        )));
    }

    Ok(credential)
}

fn unauthorized(reason: &str) -> AppError {
    debug!(reason, "request rejected by auth gate");
    AppError::Unauthorized(reason.to_string())
}

/// Axum middleware: extracts the bearer token, verifies it, and injects
/// [`AuthenticatedUser`] into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;

    let payload = state.sessions.verify(token).map_err(|e| match e {
        AuthError::Internal(msg) => AppError::Internal(msg),
        other => unauthorized(&other.to_string()),
    })?;

    request.extensions_mut().insert(AuthenticatedUser(payload));

    Ok(next.run(request).await)
}
