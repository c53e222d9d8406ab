//! User profile repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UserProfileEntity;
use crate::metrics::QueryTimer;

const PROFILE_COLUMNS: &str = "id, name, source_user_id, enable_all_folders, enabled_folders, \
     home_layout, is_default, created_at, updated_at";

/// Repository for user profile templates.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

/// Parameters for creating a profile row.
#[derive(Debug, Clone)]
pub struct NewProfileRow {
    pub name: String,
    pub source_user_id: Option<String>,
    pub enable_all_folders: bool,
    pub enabled_folders: Vec<String>,
    pub home_layout: serde_json::Value,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_profile(
        &self,
        row: NewProfileRow,
    ) -> Result<UserProfileEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_profile");
        let result = sqlx::query_as::<_, UserProfileEntity>(&format!(
            r#"
            INSERT INTO user_profiles (name, source_user_id, enable_all_folders, enabled_folders, home_layout)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PROFILE_COLUMNS}
            "#,
        ))
        .bind(&row.name)
        .bind(&row.source_user_id)
        .bind(row.enable_all_folders)
        .bind(&row.enabled_folders)
        .bind(&row.home_layout)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile_by_id");
        let result = sqlx::query_as::<_, UserProfileEntity>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list_profiles(&self) -> Result<Vec<UserProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_profiles");
        let result = sqlx::query_as::<_, UserProfileEntity>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Profile flagged as the default for new invites, if any.
    pub async fn find_default(&self) -> Result<Option<UserProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_default_profile");
        let result = sqlx::query_as::<_, UserProfileEntity>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE is_default = true"
        ))
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        enable_all_folders: Option<bool>,
        enabled_folders: Option<&[String]>,
        home_layout: Option<&serde_json::Value>,
    ) -> Result<Option<UserProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_profile");
        let result = sqlx::query_as::<_, UserProfileEntity>(&format!(
            r#"
            UPDATE user_profiles
            SET name = COALESCE($2, name),
                enable_all_folders = COALESCE($3, enable_all_folders),
                enabled_folders = COALESCE($4, enabled_folders),
                home_layout = COALESCE($5, home_layout),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(name)
        .bind(enable_all_folders)
        .bind(enabled_folders)
        .bind(home_layout)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Flag one profile as the default, clearing the flag everywhere else.
    /// Both updates run in one transaction so at most one row ever carries it.
    pub async fn set_default(&self, id: Uuid) -> Result<Option<UserProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_default_profile");
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE user_profiles SET is_default = false WHERE is_default = true")
            .execute(&mut *tx)
            .await?;

        let updated = sqlx::query_as::<_, UserProfileEntity>(&format!(
            r#"
            UPDATE user_profiles
            SET is_default = true, updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_some() {
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }
        timer.record();
        Ok(updated)
    }

    pub async fn delete_profile(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_profile");
        let result = sqlx::query("DELETE FROM user_profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// True when any non-revoked invite still points at this profile.
    pub async fn is_referenced_by_invites(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("check_profile_referenced");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM invites WHERE profile_id = $1 AND is_active = true)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
