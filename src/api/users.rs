use super::extract::{CurrentUser, MaybeUser};
use super::{ApiResult, AppState};
use crate::accounts::{ProfileUpdate, UserProfile, UserSummary};
use crate::database::models::UserRecord;
use crate::engagement::FollowStatus;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    q: String,
}

pub(crate) async fn search(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<UserSummary>> {
    Ok(Json(state.accounts().search(&query.q)?))
}

pub(crate) async fn profile(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<UserProfile> {
    let viewer_id = viewer.as_ref().map(|user| user.id.as_str());
    Ok(Json(state.accounts().profile(&id, viewer_id)?))
}

pub(crate) async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ProfileUpdate>,
) -> ApiResult<UserRecord> {
    Ok(Json(state.accounts().update_profile(&user.id, payload)?))
}

pub(crate) async fn follow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<FollowStatus> {
    Ok(Json(state.engagement().follow(&user.id, &id)?))
}

pub(crate) async fn unfollow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<FollowStatus> {
    Ok(Json(state.engagement().unfollow(&user.id, &id)?))
}

pub(crate) async fn followers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<UserSummary>> {
    Ok(Json(state.accounts().followers(&id)?))
}

pub(crate) async fn following(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<UserSummary>> {
    Ok(Json(state.accounts().following(&id)?))
}
