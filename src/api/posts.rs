use super::extract::CurrentUser;
use super::{ApiError, ApiResult, AppState};
use crate::content::{CommentsPage, CreatePostInput, ListQuery, PostDetails, PostPage, PostView};
use crate::engagement::{CommentOutcome, CommentsCount, LikeOutcome, ReactionCounts};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

pub(crate) async fn list_public(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PostPage> {
    Ok(Json(state.posts().list_public(query)?))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreatePostInput>,
) -> Result<(StatusCode, Json<PostView>), ApiError> {
    let post = state.posts().create_post(&user.id, payload)?;
    Ok((StatusCode::CREATED, Json(post)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct MyPostsQuery {
    page: Option<usize>,
    limit: Option<usize>,
    search: Option<String>,
    status: Option<String>,
}

pub(crate) async fn list_mine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<MyPostsQuery>,
) -> ApiResult<PostPage> {
    let list = ListQuery {
        page: query.page,
        limit: query.limit,
        search: query.search,
    };
    Ok(Json(
        state
            .posts()
            .list_for_author(&user.id, list, query.status)?,
    ))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PostDetails> {
    Ok(Json(state.posts().get_post(&id)?))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.posts().delete_post(&id, &user.id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<LikeOutcome> {
    Ok(Json(state.engagement().like_post(&id, &user.id)?))
}

pub(crate) async fn unlike(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<LikeOutcome> {
    Ok(Json(state.engagement().unlike_post(&id, &user.id)?))
}

pub(crate) async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CommentsPage> {
    Ok(Json(state.posts().comments(&id)?))
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateCommentRequest {
    text: String,
}

pub(crate) async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentOutcome>), ApiError> {
    let outcome = state
        .engagement()
        .add_comment(&id, &user.id, &payload.text)?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, comment_id)): Path<(String, String)>,
) -> ApiResult<CommentsCount> {
    Ok(Json(
        state
            .engagement()
            .delete_comment(&id, &comment_id, &user.id)?,
    ))
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentReactionRequest {
    #[serde(rename = "type")]
    kind: String,
}

pub(crate) async fn react_to_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, comment_id)): Path<(String, String)>,
    Json(payload): Json<CommentReactionRequest>,
) -> ApiResult<ReactionCounts> {
    Ok(Json(state.engagement().react_to_comment(
        &id,
        &comment_id,
        &user.id,
        &payload.kind,
    )?))
}
