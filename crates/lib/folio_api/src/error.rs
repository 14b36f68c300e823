//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use folio_core::auth::AuthError;
use folio_core::users::UserError;
use thiserror::Error;
use tracing::error;

use crate::models::ApiResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {}", .0.join("; "))]
    BadRequest(Vec<String>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::BadRequest(errors) => (StatusCode::BAD_REQUEST, "bad request", Some(errors)),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not found", Some(vec![m])),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", Some(vec![m])),
            AppError::Internal(m) => {
                error!(error = %m, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error", None)
            }
        };
        (status, Json(ApiResponse::<()>::error(status, message, errors))).into_response()
    }
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound => AppError::NotFound(e.to_string()),
            UserError::UsernameAlreadyExists => AppError::BadRequest(vec![e.to_string()]),
            UserError::InvalidCredentials => AppError::Unauthorized(e.to_string()),
            UserError::Db(e) => AppError::Internal(e.to_string()),
            UserError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidToken | AuthError::ExpiredToken => {
                AppError::Unauthorized(e.to_string())
            }
            AuthError::User(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errors_are_unauthorized() {
        assert!(matches!(
            AppError::from(AuthError::ExpiredToken),
            AppError::Unauthorized(m) if m == "token has expired"
        ));
        assert!(matches!(
            AppError::from(AuthError::InvalidToken),
            AppError::Unauthorized(m) if m == "token is invalid"
        ));
    }

    #[test]
    fn user_errors_pass_through_auth_errors() {
        assert!(matches!(
            AppError::from(AuthError::User(UserError::InvalidCredentials)),
            AppError::Unauthorized(m) if m == "wrong username/password"
        ));
        assert!(matches!(
            AppError::from(AuthError::User(UserError::NotFound)),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn internal_errors_hide_details() {
        let resp = AppError::Internal("redis get: connection refused".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
