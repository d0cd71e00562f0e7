use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use uuid::Uuid;

use crate::api::schemas::{normalize_email, PasswordRecoverBody, PasswordResetBody};
use crate::api::ValidJson;
use crate::auth::password::{hash_password_blocking, hash_recovery_code};
use crate::config::Environment;
use crate::database::StoreError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /password/recover - Issue a one-time recovery code
///
/// Always 201, so the response never reveals whether an account exists.
/// Only the code's hash is stored. In development the code itself goes to
/// the log in place of an e-mail; other environments never log it.
pub async fn request_password_recover(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<PasswordRecoverBody>,
) -> ApiResult<()> {
    let email = normalize_email(&body.email);

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        tracing::debug!("Password recovery requested for unknown e-mail");
        return Ok(ApiResponse::empty(StatusCode::CREATED));
    };

    let code = Uuid::new_v4().simple().to_string();
    state
        .store
        .replace_recover_token(user.id, &hash_recovery_code(&code))
        .await?;

    if state.config.environment == Environment::Development {
        tracing::info!("Password recovery code for user {}: {}", user.id, code);
    } else {
        tracing::info!("Password recovery code issued for user {}", user.id);
    }
    Ok(ApiResponse::empty(StatusCode::CREATED))
}

/// POST /password/reset - Set a new password with a recovery code
///
/// 204 on success; 401 when the code is unknown, used or expired.
pub async fn reset_password(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<PasswordResetBody>,
) -> ApiResult<()> {
    let expiry = state
        .config
        .security
        .recover_token_expiry()
        .ok_or_else(|| ApiError::internal("Recovery token expiry is out of range"))?;
    let issued_after = Utc::now() - expiry;
    let code_hash = hash_recovery_code(body.code.trim());

    // Unknown codes never reach argon2
    if state.store.find_recover_token(&code_hash, issued_after).await?.is_none() {
        return Err(StoreError::TokenNotFound.into());
    }

    let password_hash = hash_password_blocking(body.password).await?;

    let user_id = state
        .store
        .reset_password(&code_hash, issued_after, &password_hash)
        .await?;

    tracing::info!("Password reset for user {}", user_id);
    Ok(ApiResponse::no_content())
}
