use axum::extract::State;

use crate::api::schemas::{CreateProjectBody, ProjectIdResponse};
use crate::api::ValidJson;
use crate::database::models::NewProject;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// POST /projects - Create a project owned by the caller, in `BACKLOG`
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(body): ValidJson<CreateProjectBody>,
) -> ApiResult<ProjectIdResponse> {
    let project = state
        .store
        .create_project(
            auth.user_id(),
            NewProject {
                title: body.title,
                description: body.description,
            },
        )
        .await?;

    tracing::info!("Project {} created by {}", project.id, auth.user_id());
    Ok(ApiResponse::created(ProjectIdResponse {
        project_id: project.id,
    }))
}
