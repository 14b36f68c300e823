//! User and session request handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use folio_core::models::user::User;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    ApiResponse, ListUsersResponse, LoginRequest, RefreshTokenRequest, RegisterRequest,
    TokenResponse,
};

type Created<T> = (StatusCode, Json<ApiResponse<T>>);

/// Unwrap a JSON body, turning a parse failure into a 400 with its reason.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(vec![rejection.body_text()]))
}

fn require(errors: &mut Vec<String>, field: &str, value: &str) {
    if value.is_empty() {
        errors.push(format!("{field} is required"));
    }
}

fn min_len(errors: &mut Vec<String>, field: &str, value: &str, min: usize) {
    if !value.is_empty() && value.chars().count() < min {
        errors.push(format!("{field} should be at least {min} characters"));
    }
}

fn validate_registration(req: &RegisterRequest) -> Vec<String> {
    let mut errors = Vec::new();
    require(&mut errors, "full_name", &req.full_name);
    require(&mut errors, "username", &req.username);
    require(&mut errors, "password", &req.password);
    min_len(&mut errors, "full_name", &req.full_name, 3);
    min_len(&mut errors, "username", &req.username, 3);
    min_len(&mut errors, "password", &req.password, 8);
    errors
}

fn validate_login(req: &LoginRequest) -> Vec<String> {
    let mut errors = Vec::new();
    require(&mut errors, "username", &req.username);
    require(&mut errors, "password", &req.password);
    errors
}

fn validate_refresh(req: &RefreshTokenRequest) -> Vec<String> {
    let mut errors = Vec::new();
    require(&mut errors, "refresh_token", &req.refresh_token);
    require(&mut errors, "access_token", &req.access_token);
    errors
}

fn reject_if_any(errors: Vec<String>) -> AppResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::BadRequest(errors))
    }
}

/// `POST /api/v1/user/register` — create a new user account.
pub async fn register_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<Created<User>> {
    let req = body(payload)?;
    reject_if_any(validate_registration(&req))?;

    let user = state
        .users
        .register(&req.username, &req.full_name, &req.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(StatusCode::CREATED, user)),
    ))
}

/// `POST /api/v1/user/login` — authenticate with username + password.
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Created<TokenResponse>> {
    let req = body(payload)?;
    reject_if_any(validate_login(&req))?;

    let tokens = state.sessions.login(&req.username, &req.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(StatusCode::CREATED, tokens.into())),
    ))
}

/// `POST /api/v1/user/refresh-token` — exchange a refresh token for a new pair.
pub async fn refresh_token_handler(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    let req = body(payload)?;
    reject_if_any(validate_refresh(&req))?;

    let tokens = state
        .sessions
        .refresh(&req.refresh_token, &req.access_token)
        .await?;
    Ok(Json(ApiResponse::success(StatusCode::OK, tokens.into())))
}

/// `GET /api/v1/user/me` — the authenticated user's profile.
pub async fn me_handler(
    State(state): State<AppState>,
    AuthenticatedUser(payload): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = state.users.get(payload.user_id).await?;
    Ok(Json(ApiResponse::success(StatusCode::OK, user)))
}

/// `POST /api/v1/user/logout` — end the caller's refresh session.
pub async fn logout_handler(
    State(state): State<AppState>,
    AuthenticatedUser(payload): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<()>>> {
    state.sessions.revoke(payload.user_id).await?;
    Ok(Json(ApiResponse::empty(StatusCode::OK)))
}

/// `GET /api/v1/users` — all registered users.
pub async fn list_users_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ListUsersResponse>>> {
    let users = state.users.list().await?;
    Ok(Json(ApiResponse::success(
        StatusCode::OK,
        ListUsersResponse {
            count: users.len(),
            users,
        },
    )))
}
