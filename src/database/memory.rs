use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{NewProject, NewUser, Project, ProjectChanges, StatusProject, Token, TokenKind, User};
use super::store::{Store, StoreError};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    projects: HashMap<Uuid, Project>,
    tokens: HashMap<Uuid, Token>,
}

impl MemoryState {
    fn ensure_user(&self, user_id: Uuid) -> Result<(), StoreError> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(StoreError::UserNotFound)
        }
    }
}

/// Process-local store for tests and `--in-memory` development runs.
///
/// Every compound operation runs under one write guard, so it is atomic
/// with respect to other requests.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations invoked so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Remove a user directly, bypassing the API (users are never deleted
    /// through it). Used to exercise the stale-session path.
    pub async fn remove_user(&self, user_id: Uuid) -> Option<User> {
        let mut state = self.state.write().await;
        state.projects.retain(|_, p| p.owner_id != user_id);
        state.tokens.retain(|_, t| t.user_id != user_id);
        state.users.remove(&user_id)
    }

    /// Backdate a token's creation time.
    #[cfg(test)]
    pub async fn age_tokens_of(&self, user_id: Uuid, by: chrono::Duration) {
        let mut state = self.state.write().await;
        for token in state.tokens.values_mut().filter(|t| t.user_id == user_id) {
            token.created_at = token.created_at - by;
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.record_call();
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.record_call();
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::EmailTaken);
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            name: Some(user.name),
            email: user.email,
            avatar_url: None,
            password_hash: Some(user.password_hash),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        self.record_call();
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.record_call();
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn replace_recover_token(
        &self,
        user_id: Uuid,
        code_hash: &str,
    ) -> Result<Token, StoreError> {
        self.record_call();
        let mut state = self.state.write().await;
        state.ensure_user(user_id)?;

        state
            .tokens
            .retain(|_, t| !(t.user_id == user_id && t.kind == TokenKind::PasswordRecover));

        let token = Token {
            id: Uuid::new_v4(),
            kind: TokenKind::PasswordRecover,
            code_hash: code_hash.to_string(),
            user_id,
            created_at: Utc::now(),
        };
        state.tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_recover_token(
        &self,
        code_hash: &str,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<Token>, StoreError> {
        self.record_call();
        let state = self.state.read().await;

        Ok(state
            .tokens
            .values()
            .find(|t| t.kind == TokenKind::PasswordRecover && t.code_hash == code_hash)
            .filter(|t| t.created_at >= issued_after)
            .cloned())
    }

    async fn reset_password(
        &self,
        code_hash: &str,
        issued_after: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<Uuid, StoreError> {
        self.record_call();
        let mut state = self.state.write().await;

        let token = state
            .tokens
            .values()
            .find(|t| t.kind == TokenKind::PasswordRecover && t.code_hash == code_hash)
            .filter(|t| t.created_at >= issued_after)
            .cloned()
            .ok_or(StoreError::TokenNotFound)?;

        let user = state
            .users
            .get_mut(&token.user_id)
            .ok_or(StoreError::UserNotFound)?;
        user.password_hash = Some(password_hash.to_string());
        user.updated_at = Utc::now();

        state.tokens.remove(&token.id);
        Ok(token.user_id)
    }

    async fn create_project(
        &self,
        owner_id: Uuid,
        project: NewProject,
    ) -> Result<Project, StoreError> {
        self.record_call();
        let mut state = self.state.write().await;
        state.ensure_user(owner_id)?;

        let now = Utc::now();
        let created = Project {
            id: Uuid::new_v4(),
            title: project.title,
            description: project.description,
            status: StatusProject::Backlog,
            github_url: None,
            production_url: None,
            image_url: None,
            owner_id,
            created_at: now,
            updated_at: now,
        };
        state.projects.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_project(&self, user_id: Uuid, project_id: Uuid) -> Result<Project, StoreError> {
        self.record_call();
        let state = self.state.read().await;
        state.ensure_user(user_id)?;

        state
            .projects
            .get(&project_id)
            .cloned()
            .ok_or(StoreError::ProjectNotFound)
    }

    async fn update_project(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        changes: ProjectChanges,
    ) -> Result<Project, StoreError> {
        self.record_call();
        let mut state = self.state.write().await;
        state.ensure_user(user_id)?;

        let project = state
            .projects
            .get_mut(&project_id)
            .ok_or(StoreError::ProjectNotFound)?;

        project.title = changes.title;
        project.description = changes.description;
        project.github_url = changes.github_url;
        project.production_url = changes.production_url;
        project.image_url = changes.image_url;
        project.status = changes.status;
        project.updated_at = Utc::now();

        Ok(project.clone())
    }

    async fn delete_project(&self, user_id: Uuid, project_id: Uuid) -> Result<(), StoreError> {
        self.record_call();
        let mut state = self.state.write().await;
        state.ensure_user(user_id)?;

        state
            .projects
            .remove(&project_id)
            .map(|_| ())
            .ok_or(StoreError::ProjectNotFound)
    }
}
