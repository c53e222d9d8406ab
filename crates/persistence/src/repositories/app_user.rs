//! Dashboard account repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::AppUserEntity;
use crate::metrics::QueryTimer;

const APP_USER_COLUMNS: &str = "id, username, password_hash, jellyfin_user_id, role_id, \
     expires_at, is_disabled, created_at, updated_at";

/// Repository for dashboard accounts and invited-user expiry records.
#[derive(Clone)]
pub struct AppUserRepository {
    pool: PgPool,
}

/// Parameters for creating an account row.
#[derive(Debug, Clone)]
pub struct NewAppUserRow {
    pub username: String,
    pub password_hash: String,
    pub jellyfin_user_id: Option<String>,
    pub role_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AppUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, row: NewAppUserRow) -> Result<AppUserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_app_user");
        let result = sqlx::query_as::<_, AppUserEntity>(&format!(
            r#"
            INSERT INTO app_users (username, password_hash, jellyfin_user_id, role_id, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {APP_USER_COLUMNS}
            "#,
        ))
        .bind(&row.username)
        .bind(&row.password_hash)
        .bind(&row.jellyfin_user_id)
        .bind(row.role_id)
        .bind(row.expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AppUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_app_user_by_id");
        let result = sqlx::query_as::<_, AppUserEntity>(&format!(
            "SELECT {APP_USER_COLUMNS} FROM app_users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AppUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_app_user_by_username");
        let result = sqlx::query_as::<_, AppUserEntity>(&format!(
            "SELECT {APP_USER_COLUMNS} FROM app_users WHERE lower(username) = lower($1)"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_jellyfin_user_id(
        &self,
        jellyfin_user_id: &str,
    ) -> Result<Option<AppUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_app_user_by_jellyfin_id");
        let result = sqlx::query_as::<_, AppUserEntity>(&format!(
            "SELECT {APP_USER_COLUMNS} FROM app_users WHERE jellyfin_user_id = $1"
        ))
        .bind(jellyfin_user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Accounts linked to an upstream media-server user.
    pub async fn list_linked(&self) -> Result<Vec<AppUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_linked_app_users");
        let result = sqlx::query_as::<_, AppUserEntity>(&format!(
            "SELECT {APP_USER_COLUMNS} FROM app_users WHERE jellyfin_user_id IS NOT NULL"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count_users(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_app_users");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM app_users")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn update_user(
        &self,
        id: Uuid,
        role_id: Option<Uuid>,
        expires_at: Option<DateTime<Utc>>,
        is_disabled: Option<bool>,
    ) -> Result<Option<AppUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_app_user");
        let result = sqlx::query_as::<_, AppUserEntity>(&format!(
            r#"
            UPDATE app_users
            SET role_id = COALESCE($2, role_id),
                expires_at = COALESCE($3, expires_at),
                is_disabled = COALESCE($4, is_disabled),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {APP_USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(role_id)
        .bind(expires_at)
        .bind(is_disabled)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("update_app_user_password");
        let result = sqlx::query(
            "UPDATE app_users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Claim an expired account for disabling. The conditional update means
    /// only one caller wins when the sweep job and a lazy check race.
    pub async fn claim_disable(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("claim_disable_app_user");
        let result = sqlx::query(
            "UPDATE app_users SET is_disabled = true, updated_at = NOW() \
             WHERE id = $1 AND is_disabled = false",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Undo a disable claim after the upstream call failed.
    pub async fn release_disable(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("release_disable_app_user");
        let result = sqlx::query(
            "UPDATE app_users SET is_disabled = false, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Accounts past their expiry that have not been disabled yet.
    pub async fn list_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<AppUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_expired_app_users");
        let result = sqlx::query_as::<_, AppUserEntity>(&format!(
            "SELECT {APP_USER_COLUMNS} FROM app_users \
             WHERE expires_at IS NOT NULL AND expires_at <= $1 AND is_disabled = false"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Remove the local record after the upstream account is deleted.
    pub async fn delete_by_jellyfin_user_id(
        &self,
        jellyfin_user_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_app_user_by_jellyfin_id");
        let result = sqlx::query("DELETE FROM app_users WHERE jellyfin_user_id = $1")
            .bind(jellyfin_user_id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
