use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use super::models::{NewProject, NewUser, Project, ProjectChanges, StatusProject, Token, TokenKind, User};
use super::store::{Store, StoreError};

const USER_COLUMNS: &str = "id, name, email, avatar_url, password_hash, created_at, updated_at";
const PROJECT_COLUMNS: &str = "id, title, description, status, github_url, production_url, \
                               image_url, owner_id, created_at, updated_at";
const TOKEN_COLUMNS: &str = "id, kind, code_hash, user_id, created_at";

/// PostgreSQL-backed store. Multi-step operations run in one transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Lock the user row for the rest of the transaction; absent user fails.
async fn lock_user(conn: &mut PgConnection, user_id: Uuid) -> Result<(), StoreError> {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1 FOR SHARE")
        .bind(user_id)
        .fetch_optional(conn)
        .await?
        .map(|_| ())
        .ok_or(StoreError::UserNotFound)
}

async fn lock_project(conn: &mut PgConnection, project_id: Uuid) -> Result<Project, StoreError> {
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, Project>(&sql)
        .bind(project_id)
        .fetch_optional(conn)
        .await?
        .ok_or(StoreError::ProjectNotFound)
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::EmailTaken,
        _ => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        debug!("Created user {}", created.id);
        Ok(created)
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn replace_recover_token(
        &self,
        user_id: Uuid,
        code_hash: &str,
    ) -> Result<Token, StoreError> {
        let mut tx = self.pool.begin().await?;

        lock_user(&mut tx, user_id).await?;

        sqlx::query("DELETE FROM tokens WHERE user_id = $1 AND kind = $2")
            .bind(user_id)
            .bind(TokenKind::PasswordRecover)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            "INSERT INTO tokens (id, kind, code_hash, user_id) VALUES ($1, $2, $3, $4) \
             RETURNING {TOKEN_COLUMNS}"
        );
        let token = sqlx::query_as::<_, Token>(&sql)
            .bind(Uuid::new_v4())
            .bind(TokenKind::PasswordRecover)
            .bind(code_hash)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(token)
    }

    async fn find_recover_token(
        &self,
        code_hash: &str,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<Token>, StoreError> {
        let sql = format!(
            "SELECT {TOKEN_COLUMNS} FROM tokens \
             WHERE code_hash = $1 AND kind = $2 AND created_at >= $3"
        );
        Ok(sqlx::query_as::<_, Token>(&sql)
            .bind(code_hash)
            .bind(TokenKind::PasswordRecover)
            .bind(issued_after)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn reset_password(
        &self,
        code_hash: &str,
        issued_after: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<Uuid, StoreError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {TOKEN_COLUMNS} FROM tokens WHERE code_hash = $1 AND kind = $2 FOR UPDATE"
        );
        let token = sqlx::query_as::<_, Token>(&sql)
            .bind(code_hash)
            .bind(TokenKind::PasswordRecover)
            .fetch_optional(&mut *tx)
            .await?
            .filter(|token| token.created_at >= issued_after)
            .ok_or(StoreError::TokenNotFound)?;

        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(token.user_id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM tokens WHERE id = $1")
            .bind(token.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(token.user_id)
    }

    async fn create_project(
        &self,
        owner_id: Uuid,
        project: NewProject,
    ) -> Result<Project, StoreError> {
        let mut tx = self.pool.begin().await?;

        lock_user(&mut tx, owner_id).await?;

        let sql = format!(
            "INSERT INTO projects (id, title, description, status, owner_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PROJECT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Project>(&sql)
            .bind(Uuid::new_v4())
            .bind(&project.title)
            .bind(&project.description)
            .bind(StatusProject::Backlog)
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("Created project {} for owner {}", created.id, owner_id);
        Ok(created)
    }

    async fn get_project(&self, user_id: Uuid, project_id: Uuid) -> Result<Project, StoreError> {
        let mut tx = self.pool.begin().await?;

        lock_user(&mut tx, user_id).await?;

        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(project_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::ProjectNotFound)?;

        tx.commit().await?;
        Ok(project)
    }

    async fn update_project(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        changes: ProjectChanges,
    ) -> Result<Project, StoreError> {
        let mut tx = self.pool.begin().await?;

        lock_user(&mut tx, user_id).await?;
        lock_project(&mut tx, project_id).await?;

        let sql = format!(
            "UPDATE projects SET title = $2, description = $3, github_url = $4, \
             production_url = $5, image_url = $6, status = $7, updated_at = now() \
             WHERE id = $1 RETURNING {PROJECT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Project>(&sql)
            .bind(project_id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(&changes.github_url)
            .bind(&changes.production_url)
            .bind(&changes.image_url)
            .bind(changes.status)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_project(&self, user_id: Uuid, project_id: Uuid) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        lock_user(&mut tx, user_id).await?;
        lock_project(&mut tx, project_id).await?;

        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("Deleted project {}", project_id);
        Ok(())
    }
}

/// Runs against the database in `DATABASE_URL`; each test skips when it is unset.
/// Every test registers its own e-mail, so runs share one migrated database.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::DatabaseManager;

    async fn test_store() -> Option<PgStore> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping PostgreSQL store test");
            return None;
        };

        let mut config = AppConfig::for_tests().database;
        config.url = Some(url);
        config.max_connections = 2;

        let pool = DatabaseManager::connect(&config).await.unwrap();
        DatabaseManager::migrate(&pool).await.unwrap();
        Some(PgStore::new(pool))
    }

    async fn new_user(store: &PgStore) -> User {
        store
            .create_user(NewUser {
                name: "Ragnar".to_string(),
                email: format!("ragnar-{}@floki.dev", Uuid::new_v4()),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    fn new_project() -> NewProject {
        NewProject {
            title: "Floki API".to_string(),
            description: "x".to_string(),
        }
    }

    fn changes(status: StatusProject) -> ProjectChanges {
        ProjectChanges {
            title: "Floki API v2".to_string(),
            description: "rewritten".to_string(),
            github_url: Some("https://github.com/floki/api".to_string()),
            production_url: None,
            image_url: None,
            status,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_email_taken() {
        let Some(store) = test_store().await else { return };
        let user = new_user(&store).await;

        let err = store
            .create_user(NewUser {
                name: "Other".to_string(),
                email: user.email.clone(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken), "{err:?}");
    }

    #[tokio::test]
    async fn project_operations_recheck_the_user() {
        let Some(store) = test_store().await else { return };
        let user = new_user(&store).await;
        let project = store.create_project(user.id, new_project()).await.unwrap();
        let stranger = Uuid::new_v4();

        assert!(matches!(
            store.create_project(stranger, new_project()).await,
            Err(StoreError::UserNotFound)
        ));
        assert!(matches!(
            store.get_project(stranger, project.id).await,
            Err(StoreError::UserNotFound)
        ));
        assert!(matches!(
            store.update_project(stranger, project.id, changes(StatusProject::Done)).await,
            Err(StoreError::UserNotFound)
        ));
        assert!(matches!(
            store.delete_project(stranger, project.id).await,
            Err(StoreError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn missing_project_is_project_not_found() {
        let Some(store) = test_store().await else { return };
        let user = new_user(&store).await;
        let missing = Uuid::new_v4();

        assert!(matches!(
            store.get_project(user.id, missing).await,
            Err(StoreError::ProjectNotFound)
        ));
        assert!(matches!(
            store.update_project(user.id, missing, changes(StatusProject::Done)).await,
            Err(StoreError::ProjectNotFound)
        ));
        assert!(matches!(
            store.delete_project(user.id, missing).await,
            Err(StoreError::ProjectNotFound)
        ));
    }

    #[tokio::test]
    async fn project_lifecycle_round_trips_through_sql() {
        let Some(store) = test_store().await else { return };
        let user = new_user(&store).await;

        let created = store.create_project(user.id, new_project()).await.unwrap();
        assert_eq!(created.owner_id, user.id);
        assert_eq!(created.status, StatusProject::Backlog);

        let updated = store
            .update_project(user.id, created.id, changes(StatusProject::InProgress))
            .await
            .unwrap();
        assert_eq!(updated.title, "Floki API v2");
        assert_eq!(updated.status, StatusProject::InProgress);
        assert_eq!(updated.github_url.as_deref(), Some("https://github.com/floki/api"));

        let fetched = store.get_project(user.id, created.id).await.unwrap();
        assert_eq!(fetched.title, updated.title);
        assert_eq!(fetched.status, updated.status);

        store.delete_project(user.id, created.id).await.unwrap();
        assert!(matches!(
            store.delete_project(user.id, created.id).await,
            Err(StoreError::ProjectNotFound)
        ));
    }

    #[tokio::test]
    async fn recover_token_is_replaced_expired_and_consumed() {
        let Some(store) = test_store().await else { return };
        let user = new_user(&store).await;
        let first = format!("first-{}", Uuid::new_v4());
        let second = format!("second-{}", Uuid::new_v4());
        let since = Utc::now() - chrono::Duration::hours(1);

        store.replace_recover_token(user.id, &first).await.unwrap();
        store.replace_recover_token(user.id, &second).await.unwrap();

        // Replaced
        assert!(store.find_recover_token(&first, since).await.unwrap().is_none());
        assert!(matches!(
            store.reset_password(&first, since, "new").await,
            Err(StoreError::TokenNotFound)
        ));

        // Expired: issued before the cutoff
        let cutoff = Utc::now() + chrono::Duration::minutes(1);
        assert!(store.find_recover_token(&second, cutoff).await.unwrap().is_none());
        assert!(matches!(
            store.reset_password(&second, cutoff, "new").await,
            Err(StoreError::TokenNotFound)
        ));

        let token = store.find_recover_token(&second, since).await.unwrap().unwrap();
        assert_eq!(token.user_id, user.id);
        assert_eq!(store.reset_password(&second, since, "new-hash").await.unwrap(), user.id);

        let reloaded = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash.as_deref(), Some("new-hash"));

        // Consumed
        assert!(matches!(
            store.reset_password(&second, since, "newer").await,
            Err(StoreError::TokenNotFound)
        ));
    }
}
