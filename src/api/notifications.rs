use super::extract::CurrentUser;
use super::{ApiError, ApiResult, AppState};
use crate::notifications::Inbox;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InboxQuery {
    limit: Option<usize>,
    #[serde(default)]
    unread_only: bool,
}

pub(crate) async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<InboxQuery>,
) -> ApiResult<Inbox> {
    Ok(Json(state.notifications().list(
        &user.id,
        query.unread_only,
        query.limit,
    )?))
}

pub(crate) async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    state.notifications().mark_read(&id, &user.id)?;
    Ok(Json(serde_json::json!({ "message": "Notification marked as read" })))
}

pub(crate) async fn mark_all_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<serde_json::Value> {
    state.notifications().mark_all_read(&user.id)?;
    Ok(Json(serde_json::json!({ "message": "All notifications marked as read" })))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.notifications().delete(&id, &user.id)?;
    Ok(StatusCode::NO_CONTENT)
}
