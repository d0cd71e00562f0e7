use axum::extract::State;

use crate::api::schemas::{ProfileResponse, ProfileUser};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /profile - The authenticated user's public profile
pub async fn get_profile(State(state): State<AppState>, auth: AuthUser) -> ApiResult<ProfileResponse> {
    let user = state
        .store
        .find_user(auth.user_id())
        .await?
        .ok_or_else(|| ApiError::bad_request("User not found"))?;

    Ok(ApiResponse::success(ProfileResponse {
        user: ProfileUser::from(user),
    }))
}
