use axum::extract::State;

use crate::api::schemas::{GetProjectResponse, ProjectParams};
use crate::api::ValidPath;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /projects/:projectId
pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(params): ValidPath<ProjectParams>,
) -> ApiResult<GetProjectResponse> {
    let project = state
        .store
        .get_project(auth.user_id(), params.project_id)
        .await?;

    Ok(ApiResponse::success(GetProjectResponse {
        project: project.into(),
    }))
}
