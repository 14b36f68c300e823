//! # folio_api
//!
//! HTTP API library for Folio.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use folio_core::auth::{RefreshTokenStore, SessionService, TokenCodec};
use folio_core::users::{UserRepository, UserService};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{health, user};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Token issuing, verification and refresh sessions.
    pub sessions: SessionService,
    /// Registration and profile lookups.
    pub users: UserService,
}

impl AppState {
    /// Wire the services once at startup from configuration and backends.
    pub fn compose(
        config: &ApiConfig,
        store: Arc<dyn RefreshTokenStore>,
        repo: Arc<dyn UserRepository>,
    ) -> Self {
        let users = UserService::new(repo);
        let sessions = SessionService::new(
            TokenCodec::new(config.jwt_secret.as_bytes()),
            store,
            users.clone(),
            config.session_config(),
        );
        Self { sessions, users }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_HEALTH, get(health::health_handler))
        .route(routes::POST_USER_REGISTER, post(user::register_handler))
        .route(routes::POST_USER_LOGIN, post(user::login_handler))
        .route(routes::POST_USER_REFRESH_TOKEN, post(user::refresh_token_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::GET_USER_ME, get(user::me_handler))
        .route(routes::POST_USER_LOGOUT, post(user::logout_handler))
        .route(routes::GET_USERS, get(user::list_users_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
