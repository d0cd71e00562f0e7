use axum::{extract::State, http::StatusCode};

use crate::api::schemas::{normalize_email, CreateAccountBody};
use crate::api::ValidJson;
use crate::auth::password::hash_password_blocking;
use crate::database::models::NewUser;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /users - Register a new account
///
/// ```json
/// { "name": "Ragnar", "email": "ragnar@floki.dev", "password": "123456" }
/// ```
///
/// 201 with an empty body; 409 when the e-mail is already registered.
pub async fn create_account(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CreateAccountBody>,
) -> ApiResult<()> {
    let email = normalize_email(&body.email);
    let password_hash = hash_password_blocking(body.password).await?;

    let user = state
        .store
        .create_user(NewUser {
            name: body.name.trim().to_string(),
            email,
            password_hash,
        })
        .await?;

    tracing::info!("Account created: {}", user.id);
    Ok(ApiResponse::empty(StatusCode::CREATED))
}
