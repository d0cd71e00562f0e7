use axum::extract::State;

use crate::api::schemas::{normalize_email, AuthenticateBody, TokenResponse};
use crate::api::ValidJson;
use crate::auth::password::verify_password_blocking;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /sessions/password - Exchange e-mail and password for a bearer token
///
/// Unknown e-mail and wrong password answer identically.
pub async fn authenticate_with_password(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<AuthenticateBody>,
) -> ApiResult<TokenResponse> {
    let email = normalize_email(&body.email);

    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid credentials"))?;

    let password_hash = user.password_hash.ok_or_else(|| {
        ApiError::bad_request("User does not have a password, use social login")
    })?;

    if !verify_password_blocking(body.password, password_hash).await? {
        tracing::warn!("Failed password login for user {}", user.id);
        return Err(ApiError::bad_request("Invalid credentials"));
    }

    let token = state.tokens.issue(user.id)?;

    Ok(ApiResponse::created(TokenResponse { token }))
}
