use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of a project. Stored as the `status_project` postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "status_project", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusProject {
    #[default]
    Backlog,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: StatusProject,
    pub github_url: Option<String>,
    pub production_url: Option<String>,
    pub image_url: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied at creation; the owner comes from the authenticated user.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
}

/// Full replacement of the mutable fields. `None` clears a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectChanges {
    pub title: String,
    pub description: String,
    pub github_url: Option<String>,
    pub production_url: Option<String>,
    pub image_url: Option<String>,
    pub status: StatusProject,
}
