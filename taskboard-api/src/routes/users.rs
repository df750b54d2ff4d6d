/// The caller's own profile
///
/// The client calls `PUT /v1/users/me` right after sign-in; the profile is
/// built from the verified session claims, never from the request body.
///
/// # Endpoints
///
/// ```text
/// GET  /v1/users/me        -> 200 User | 404
/// PUT  /v1/users/me        -> 200 User (created or refreshed)
/// POST /v1/users/me/seen   -> 204
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use taskboard_shared::auth::middleware::SessionContext;
use taskboard_shared::models::user::User;

/// Returns the synced profile
pub async fn get_me(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Json<User>> {
    let user = state
        .users
        .find_by_identity(&session.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    Ok(Json(user))
}

/// Creates or refreshes the profile from the session claims
pub async fn sync_me(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Json<User>> {
    let user = state.users.upsert(session.to_profile()).await?;
    Ok(Json(user))
}

/// Records activity
pub async fn touch_me(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<StatusCode> {
    state.users.touch_last_seen(&session.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
