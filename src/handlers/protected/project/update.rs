use axum::extract::State;

use crate::api::schemas::{ProjectIdResponse, ProjectParams, UpdateProjectBody};
use crate::api::{ValidJson, ValidPath};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// PUT /projects/:projectId - Replace every mutable field
///
/// Links left out of the body are cleared, not preserved.
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(params): ValidPath<ProjectParams>,
    ValidJson(body): ValidJson<UpdateProjectBody>,
) -> ApiResult<ProjectIdResponse> {
    let project = state
        .store
        .update_project(auth.user_id(), params.project_id, body.into())
        .await?;

    tracing::info!("Project {} updated by {}", project.id, auth.user_id());
    Ok(ApiResponse::created(ProjectIdResponse {
        project_id: project.id,
    }))
}
