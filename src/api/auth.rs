use super::extract::CurrentUser;
use super::{ApiError, ApiResult, AppState};
use crate::accounts::RegisterInput;
use crate::database::models::UserRecord;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct SessionResponse {
    token: String,
    user: UserRecord,
}

pub(crate) async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterInput>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let user = state.accounts().register(payload)?;
    let token = state.tokens.issue(&user.id)?;
    Ok((StatusCode::CREATED, Json(SessionResponse { token, user })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest {
    email_or_username: String,
    password: String,
}

pub(crate) async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<SessionResponse> {
    let user = state
        .accounts()
        .login(&payload.email_or_username, &payload.password)?;
    let token = state.tokens.issue(&user.id)?;
    Ok(Json(SessionResponse { token, user }))
}

pub(crate) async fn me(CurrentUser(user): CurrentUser) -> ApiResult<UserRecord> {
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

pub(crate) async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<serde_json::Value> {
    state
        .accounts()
        .change_password(&user.id, &payload.current_password, &payload.new_password)?;
    Ok(Json(serde_json::json!({ "message": "Password updated" })))
}

pub(crate) async fn delete_account(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError> {
    state.accounts().delete_account(&user.id)?;
    Ok(StatusCode::NO_CONTENT)
}
