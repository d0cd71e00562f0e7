use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::models::{NewProject, NewUser, Project, ProjectChanges, Token, User};

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User not found")]
    UserNotFound,

    #[error("Project not found")]
    ProjectNotFound,

    #[error("E-mail already registered")]
    EmailTaken,

    #[error("Recovery token not found or expired")]
    TokenNotFound,

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Persistence capability handed to every handler through `AppState`.
///
/// Project operations take the authenticated user's id and re-check that the
/// user still exists before touching the project, failing with
/// [`StoreError::UserNotFound`]. Operations on an existing project then fail
/// with [`StoreError::ProjectNotFound`] when it is absent. Each operation is
/// atomic: the checks and the mutation observe the same state.
#[async_trait]
pub trait Store: Send + Sync {
    /// Connectivity probe for `/health`.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Fails with [`StoreError::EmailTaken`] when the email is registered.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Drop any previous recovery token of the user and store a new one.
    async fn replace_recover_token(
        &self,
        user_id: Uuid,
        code_hash: &str,
    ) -> Result<Token, StoreError>;

    /// Live recovery token matching `code_hash`, created at or after
    /// `issued_after`.
    async fn find_recover_token(
        &self,
        code_hash: &str,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<Token>, StoreError>;

    /// Consume the recovery token matching `code_hash` and set the user's
    /// password hash. Tokens created before `issued_after` are expired.
    /// Returns the user id whose password changed.
    async fn reset_password(
        &self,
        code_hash: &str,
        issued_after: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<Uuid, StoreError>;

    async fn create_project(
        &self,
        owner_id: Uuid,
        project: NewProject,
    ) -> Result<Project, StoreError>;

    async fn get_project(&self, user_id: Uuid, project_id: Uuid) -> Result<Project, StoreError>;

    async fn update_project(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        changes: ProjectChanges,
    ) -> Result<Project, StoreError>;

    async fn delete_project(&self, user_id: Uuid, project_id: Uuid) -> Result<(), StoreError>;
}
