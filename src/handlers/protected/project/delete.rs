use axum::extract::State;

use crate::api::schemas::ProjectParams;
use crate::api::ValidPath;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// DELETE /projects/:projectId - 204 on success, 400 once already gone
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(params): ValidPath<ProjectParams>,
) -> ApiResult<()> {
    state
        .store
        .delete_project(auth.user_id(), params.project_id)
        .await?;

    tracing::info!("Project {} deleted by {}", params.project_id, auth.user_id());
    Ok(ApiResponse::no_content())
}
