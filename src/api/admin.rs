use super::extract::AdminUser;
use super::{ApiError, ApiResult, AppState};
use crate::content::{ListQuery, PostPage, PostView};
use crate::database::models::UserRecord;
use crate::moderation::{PlatformStats, UserPage};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

pub(crate) async fn stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<PlatformStats> {
    Ok(Json(state.admin().stats()?))
}

pub(crate) async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<UserPage> {
    Ok(Json(state.admin().list_users(query)?))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SetRoleRequest {
    role: String,
}

pub(crate) async fn set_role(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<SetRoleRequest>,
) -> ApiResult<UserRecord> {
    Ok(Json(state.admin().set_role(&id, &payload.role)?))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SetSuspendedRequest {
    suspended: bool,
}

pub(crate) async fn set_suspended(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<SetSuspendedRequest>,
) -> ApiResult<UserRecord> {
    Ok(Json(state.admin().set_suspended(&id, payload.suspended)?))
}

pub(crate) async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if admin.id == id {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account here".into(),
        ));
    }
    state.admin().delete_user(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn list_posts(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<PostPage> {
    Ok(Json(state.admin().list_posts(query)?))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SetHiddenRequest {
    hidden: bool,
}

pub(crate) async fn set_post_hidden(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<SetHiddenRequest>,
) -> ApiResult<PostView> {
    Ok(Json(state.admin().set_post_hidden(&id, payload.hidden)?))
}

pub(crate) async fn delete_post(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.admin().delete_post(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
