//! Request guards: bearer-token authentication as axum extractors.

use super::{ApiError, AppState};
use crate::database::models::UserRecord;
use crate::database::repositories::UserRepository;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// The authenticated, non-suspended user behind the bearer token.
pub(crate) struct CurrentUser(pub UserRecord);

/// An authenticated user with the admin role.
pub(crate) struct AdminUser(pub UserRecord);

/// Optional authentication: `None` when no token was sent. An invalid or
/// suspended token is still an error, not anonymity.
pub(crate) struct MaybeUser(pub Option<UserRecord>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn authenticate(state: &AppState, token: &str) -> Result<UserRecord, ApiError> {
    let user_id = state
        .tokens
        .verify(token)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".into()))?;
    let user = state
        .database
        .with_repositories(|repos| repos.users().get(&user_id))?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".into()))?;
    if user.suspended {
        return Err(ApiError::Forbidden("Account suspended".into()));
    }
    Ok(user)
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))?;
        Ok(CurrentUser(authenticate(state, token)?))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::Forbidden("Admin access required".into()));
        }
        Ok(AdminUser(user))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            Some(token) => Ok(MaybeUser(Some(authenticate(state, token)?))),
            None => Ok(MaybeUser(None)),
        }
    }
}
