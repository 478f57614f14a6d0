mod admin;
mod auth;
mod extract;
mod notifications;
mod posts;
mod users;

use crate::accounts::AccountService;
use crate::auth::TokenIssuer;
use crate::config::InkstreamConfig;
use crate::content::PostService;
use crate::database::Database;
use crate::engagement::EngagementService;
use crate::error::DomainError;
use crate::moderation::AdminService;
use crate::notifications::NotificationService;
use anyhow::Result;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: InkstreamConfig,
    pub database: Database,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(config: InkstreamConfig, database: Database) -> Self {
        let tokens = Arc::new(TokenIssuer::new(&config.auth));
        Self {
            config,
            database,
            tokens,
        }
    }

    pub(crate) fn accounts(&self) -> AccountService {
        AccountService::new(self.database.clone())
    }

    pub(crate) fn posts(&self) -> PostService {
        PostService::new(self.database.clone())
    }

    pub(crate) fn engagement(&self) -> EngagementService {
        EngagementService::new(self.database.clone())
    }

    pub(crate) fn notifications(&self) -> NotificationService {
        NotificationService::new(self.database.clone())
    }

    pub(crate) fn admin(&self) -> AdminService {
        AdminService::new(self.database.clone())
    }
}

pub(crate) type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Internal(anyhow::Error),
}

impl ApiError {
    fn into_response_parts(self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse { error: msg }),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorResponse { error: msg })
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorResponse { error: msg }),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse { error: msg }),
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal server error".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_response_parts();
        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg)
            | DomainError::Conflict(msg)
            | DomainError::InvalidOperation(msg) => ApiError::BadRequest(msg),
            DomainError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            DomainError::Forbidden(msg) => ApiError::Forbidden(msg),
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Internal(err) => ApiError::Internal(err),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/password", put(auth::change_password))
        .route("/auth/account", delete(auth::delete_account))
        .route("/users/search", get(users::search))
        .route("/users/me", put(users::update_profile))
        .route("/users/:id", get(users::profile))
        .route("/users/:id/follow", post(users::follow))
        .route("/users/:id/unfollow", post(users::unfollow))
        .route("/users/:id/followers", get(users::followers))
        .route("/users/:id/following", get(users::following))
        .route("/posts", get(posts::list_public).post(posts::create))
        .route("/posts/my", get(posts::list_mine))
        .route("/posts/:id", get(posts::get).delete(posts::delete))
        .route("/posts/:id/like", post(posts::like).delete(posts::unlike))
        .route(
            "/posts/:id/comments",
            get(posts::list_comments).post(posts::create_comment),
        )
        .route(
            "/posts/:id/comments/:comment_id",
            delete(posts::delete_comment),
        )
        .route(
            "/posts/:id/comments/:comment_id/reaction",
            post(posts::react_to_comment),
        )
        .route("/notifications", get(notifications::list))
        .route(
            "/notifications/mark-all-read",
            put(notifications::mark_all_read),
        )
        .route(
            "/notifications/:id/read",
            put(notifications::mark_read),
        )
        .route("/notifications/:id", delete(notifications::delete))
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id/role", put(admin::set_role))
        .route("/admin/users/:id/suspend", put(admin::set_suspended))
        .route("/admin/users/:id", delete(admin::delete_user))
        .route("/admin/posts", get(admin::list_posts))
        .route("/admin/posts/:id/hidden", put(admin::set_post_hidden))
        .route("/admin/posts/:id", delete(admin::delete_post))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Tries to bind to the given port, or finds the next available port
async fn find_available_port(start_port: u16) -> Result<(TcpListener, u16)> {
    const MAX_PORT_ATTEMPTS: u16 = 100;

    for offset in 0..MAX_PORT_ATTEMPTS {
        let port = start_port + offset;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        match TcpListener::bind(addr).await {
            Ok(listener) => return Ok((listener, port)),
            Err(e) => {
                if offset == 0 {
                    tracing::debug!(port, error = %e, "Port in use, trying next port");
                }
                continue;
            }
        }
    }

    anyhow::bail!(
        "Could not find available port in range {}-{}",
        start_port,
        start_port + MAX_PORT_ATTEMPTS - 1
    )
}

pub async fn serve_http(config: InkstreamConfig, database: Database) -> Result<()> {
    let api_port = config.api_port;
    let state = AppState::new(config, database);
    let router = build_router(state);

    let (listener, actual_port) = find_available_port(api_port).await?;
    let addr = SocketAddr::from(([0, 0, 0, 0], actual_port));

    if actual_port != api_port {
        tracing::warn!(
            requested_port = api_port,
            actual_port,
            "Configured port was in use, bound to next available port"
        );
    }

    tracing::info!(?addr, "HTTP server listening");
    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}
