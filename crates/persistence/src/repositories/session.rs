//! Session repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{SessionEntity, SessionWithUserEntity};
use crate::metrics::QueryTimer;

/// Repository for dashboard login sessions. Only token hashes are stored.
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_session(
        &self,
        app_user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<SessionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_session");
        let result = sqlx::query_as::<_, SessionEntity>(
            r#"
            INSERT INTO sessions (app_user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, app_user_id, token_hash, expires_at, created_at
            "#,
        )
        .bind(app_user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Look up a live session by token hash, joined with the account and its
    /// role flags. Expired sessions are filtered out here, not by the caller.
    pub async fn find_valid(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionWithUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_valid_session");
        let result = sqlx::query_as::<_, SessionWithUserEntity>(
            r#"
            SELECT s.id AS session_id,
                   s.expires_at,
                   u.id AS app_user_id,
                   u.username,
                   u.role_id,
                   u.is_disabled,
                   COALESCE(r.is_admin, false) AS is_admin
            FROM sessions s
            JOIN app_users u ON u.id = s.app_user_id
            LEFT JOIN user_roles r ON r.id = u.role_id
            WHERE s.token_hash = $1 AND s.expires_at > $2
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn delete_by_token_hash(&self, token_hash: &str) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_session");
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    pub async fn delete_for_user(&self, app_user_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_sessions_for_user");
        let result = sqlx::query("DELETE FROM sessions WHERE app_user_id = $1")
            .bind(app_user_id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Prune sessions past their expiry. Run from the background sweep.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_expired_sessions");
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
