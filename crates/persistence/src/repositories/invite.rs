//! Invite repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::InviteEntity;
use crate::metrics::QueryTimer;

const INVITE_COLUMNS: &str = "id, code, label, user_label, profile_id, max_uses, used_count, \
     expires_at, user_expiry_minutes, is_active, created_by, created_at";

/// Repository for invite-related database operations.
#[derive(Clone)]
pub struct InviteRepository {
    pool: PgPool,
}

/// Parameters for creating an invite row.
#[derive(Debug, Clone)]
pub struct NewInviteRow {
    pub code: String,
    pub label: Option<String>,
    pub user_label: Option<String>,
    pub profile_id: Option<Uuid>,
    pub max_uses: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user_expiry_minutes: Option<i64>,
    pub created_by: Option<Uuid>,
}

impl InviteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new invite.
    pub async fn create_invite(&self, row: NewInviteRow) -> Result<InviteEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_invite");
        let result = sqlx::query_as::<_, InviteEntity>(&format!(
            r#"
            INSERT INTO invites (code, label, user_label, profile_id, max_uses, expires_at, user_expiry_minutes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {INVITE_COLUMNS}
            "#,
        ))
        .bind(&row.code)
        .bind(&row.label)
        .bind(&row.user_label)
        .bind(row.profile_id)
        .bind(row.max_uses)
        .bind(row.expires_at)
        .bind(row.user_expiry_minutes)
        .bind(row.created_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an invite by ID, regardless of active state.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<InviteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invite_by_id");
        let result = sqlx::query_as::<_, InviteEntity>(&format!(
            "SELECT {INVITE_COLUMNS} FROM invites WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an invite by code. Revoked rows are returned too; redemption
    /// failure classification needs to see them.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<InviteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invite_by_code");
        let result = sqlx::query_as::<_, InviteEntity>(&format!(
            "SELECT {INVITE_COLUMNS} FROM invites WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List all non-revoked invites, newest first.
    pub async fn list_invites(&self) -> Result<Vec<InviteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_invites");
        let result = sqlx::query_as::<_, InviteEntity>(&format!(
            "SELECT {INVITE_COLUMNS} FROM invites WHERE is_active = true ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update mutable invite fields. Null arguments leave the column as is.
    pub async fn update_invite(
        &self,
        id: Uuid,
        label: Option<&str>,
        user_label: Option<&str>,
        profile_id: Option<Uuid>,
        max_uses: Option<i32>,
        expires_at: Option<DateTime<Utc>>,
        user_expiry_minutes: Option<i64>,
    ) -> Result<Option<InviteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_invite");
        let result = sqlx::query_as::<_, InviteEntity>(&format!(
            r#"
            UPDATE invites
            SET label = COALESCE($2, label),
                user_label = COALESCE($3, user_label),
                profile_id = COALESCE($4, profile_id),
                max_uses = COALESCE($5, max_uses),
                expires_at = COALESCE($6, expires_at),
                user_expiry_minutes = COALESCE($7, user_expiry_minutes)
            WHERE id = $1 AND is_active = true
            RETURNING {INVITE_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(label)
        .bind(user_label)
        .bind(profile_id)
        .bind(max_uses)
        .bind(expires_at)
        .bind(user_expiry_minutes)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Revoke (soft delete) an invite. The row stays for the audit trail.
    pub async fn revoke_invite(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("revoke_invite");
        let result = sqlx::query(
            "UPDATE invites SET is_active = false WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Atomically reserve one use of an invite.
    ///
    /// The guard re-checks budget and expiry inside the UPDATE, so two
    /// concurrent redemptions of a one-use invite cannot both succeed.
    /// Returns the row as it looks after the increment, or None when no
    /// redeemable row matched.
    pub async fn reserve_use(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<InviteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("reserve_invite_use");
        let result = sqlx::query_as::<_, InviteEntity>(&format!(
            r#"
            UPDATE invites
            SET used_count = used_count + 1
            WHERE code = $1
              AND is_active = true
              AND (max_uses IS NULL OR used_count < max_uses)
              AND (expires_at IS NULL OR expires_at > $2)
            RETURNING {INVITE_COLUMNS}
            "#,
        ))
        .bind(code)
        .bind(now)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Roll back a reserved use after a definitive upstream failure.
    pub async fn release_use(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("release_invite_use");
        let result =
            sqlx::query("UPDATE invites SET used_count = used_count - 1 WHERE id = $1 AND used_count > 0")
                .bind(id)
                .execute(&self.pool)
                .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Check if a code exists (active or not; codes are never reused).
    pub async fn code_exists(&self, code: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("check_invite_code_exists");
        let result =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM invites WHERE code = $1)")
                .bind(code)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result
    }

    /// Generate a unique invite code by retrying on collision.
    pub async fn generate_unique_code<F>(&self, generator: F) -> Result<String, sqlx::Error>
    where
        F: Fn() -> String,
    {
        let mut code = generator();
        let mut attempts = 0;

        while self.code_exists(&code).await? {
            code = generator();
            attempts += 1;
            if attempts > 100 {
                return Err(sqlx::Error::Protocol(
                    "Could not generate unique invite code".to_string(),
                ));
            }
        }

        Ok(code)
    }

    /// Count invites that are still redeemable at `now`.
    pub async fn count_redeemable(&self, now: DateTime<Utc>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_redeemable_invites");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM invites
            WHERE is_active = true
              AND (max_uses IS NULL OR used_count < max_uses)
              AND (expires_at IS NULL OR expires_at > $1)
            "#,
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    // InviteRepository queries require a database connection and are
    // covered by the integration tests in crates/api/tests.
}
