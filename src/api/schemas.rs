//! Request and response shapes for every route.

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::extract::{is_valid_email, FieldErrors, Validate};
use crate::database::models::{Project, ProjectChanges, StatusProject, User};

pub const MIN_PASSWORD_LENGTH: usize = 6;

fn check_email(errors: &mut FieldErrors, email: &str) {
    if !is_valid_email(email.trim()) {
        errors.insert("email".to_string(), "Invalid e-mail address".to_string());
    }
}

fn check_password(errors: &mut FieldErrors, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.insert(
            "password".to_string(),
            format!("Password must have at least {MIN_PASSWORD_LENGTH} characters"),
        );
    }
}

fn finish(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Lowercased and trimmed so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Projects

#[derive(Debug, Deserialize)]
pub struct ProjectParams {
    #[serde(rename = "projectId")]
    pub project_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectBody {
    pub title: String,
    pub description: String,
}

impl Validate for CreateProjectBody {}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectBody {
    pub title: String,
    pub description: String,
    #[serde(rename = "githubURL", default)]
    pub github_url: Option<Url>,
    #[serde(rename = "productionURL", default)]
    pub production_url: Option<Url>,
    #[serde(rename = "imageURL", default)]
    pub image_url: Option<Url>,
    pub status: StatusProject,
}

impl Validate for UpdateProjectBody {}

impl From<UpdateProjectBody> for ProjectChanges {
    fn from(body: UpdateProjectBody) -> Self {
        Self {
            title: body.title,
            description: body.description,
            github_url: body.github_url.map(String::from),
            production_url: body.production_url.map(String::from),
            image_url: body.image_url.map(String::from),
            status: body.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectIdResponse {
    #[serde(rename = "projectId")]
    pub project_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

impl From<Project> for ProjectSummary {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            title: project.title,
            description: project.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GetProjectResponse {
    pub project: ProjectSummary,
}

// ---------------------------------------------------------------------------
// Accounts

#[derive(Debug, Deserialize)]
pub struct CreateAccountBody {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Validate for CreateAccountBody {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.insert("name".to_string(), "Name is required".to_string());
        }
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        finish(errors)
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthenticateBody {
    pub email: String,
    pub password: String,
}

impl Validate for AuthenticateBody {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        finish(errors)
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: Option<String>,
}

impl From<User> for ProfileUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: ProfileUser,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRecoverBody {
    pub email: String,
}

impl Validate for PasswordRecoverBody {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        finish(errors)
    }
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetBody {
    pub code: String,
    pub password: String,
}

impl Validate for PasswordResetBody {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.code.trim().is_empty() {
            errors.insert("code".to_string(), "Recovery code is required".to_string());
        }
        check_password(&mut errors, &self.password);
        finish(errors)
    }
}
