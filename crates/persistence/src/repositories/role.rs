//! Application role repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UserRoleEntity;
use crate::metrics::QueryTimer;

const ROLE_COLUMNS: &str =
    "id, name, description, is_default, is_admin, permissions, created_at, updated_at";

/// Repository for dashboard roles.
#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_role(
        &self,
        name: &str,
        description: Option<&str>,
        is_admin: bool,
        permissions: &serde_json::Value,
    ) -> Result<UserRoleEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_role");
        let result = sqlx::query_as::<_, UserRoleEntity>(&format!(
            r#"
            INSERT INTO user_roles (name, description, is_admin, permissions)
            VALUES ($1, $2, $3, $4)
            RETURNING {ROLE_COLUMNS}
            "#,
        ))
        .bind(name)
        .bind(description)
        .bind(is_admin)
        .bind(permissions)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRoleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_role_by_id");
        let result = sqlx::query_as::<_, UserRoleEntity>(&format!(
            "SELECT {ROLE_COLUMNS} FROM user_roles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<UserRoleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_role_by_name");
        let result = sqlx::query_as::<_, UserRoleEntity>(&format!(
            "SELECT {ROLE_COLUMNS} FROM user_roles WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list_roles(&self) -> Result<Vec<UserRoleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_roles");
        let result = sqlx::query_as::<_, UserRoleEntity>(&format!(
            "SELECT {ROLE_COLUMNS} FROM user_roles ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Role assigned to accounts created without an explicit role, if any.
    pub async fn find_default(&self) -> Result<Option<UserRoleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_default_role");
        let result = sqlx::query_as::<_, UserRoleEntity>(&format!(
            "SELECT {ROLE_COLUMNS} FROM user_roles WHERE is_default = true"
        ))
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update_role(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        is_admin: Option<bool>,
        permissions: Option<&serde_json::Value>,
    ) -> Result<Option<UserRoleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_role");
        let result = sqlx::query_as::<_, UserRoleEntity>(&format!(
            r#"
            UPDATE user_roles
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_admin = COALESCE($4, is_admin),
                permissions = COALESCE($5, permissions),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ROLE_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(is_admin)
        .bind(permissions)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Flag one role as the default, clearing the flag everywhere else.
    pub async fn set_default(&self, id: Uuid) -> Result<Option<UserRoleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_default_role");
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE user_roles SET is_default = false WHERE is_default = true")
            .execute(&mut *tx)
            .await?;

        let updated = sqlx::query_as::<_, UserRoleEntity>(&format!(
            r#"
            UPDATE user_roles
            SET is_default = true, updated_at = NOW()
            WHERE id = $1
            RETURNING {ROLE_COLUMNS}
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

    pub async fn delete_role(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_role");
        let result = sqlx::query("DELETE FROM user_roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// True when any dashboard account still holds this role.
    pub async fn is_referenced_by_users(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("check_role_referenced");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM app_users WHERE role_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
