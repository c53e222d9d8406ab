//! Activity log repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::activity::NewActivity;
use sqlx::PgPool;

use crate::entities::ActivityLogEntity;
use crate::metrics::QueryTimer;

const ACTIVITY_COLUMNS: &str = "id, activity_type, message, username, jellyfin_user_id, \
     invite_code, created_by, metadata, created_at";

/// Repository for the append-only activity log.
#[derive(Clone)]
pub struct ActivityLogRepository {
    pool: PgPool,
}

impl ActivityLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, entry: NewActivity) -> Result<ActivityLogEntity, sqlx::Error> {
        let timer = QueryTimer::new("append_activity");
        let result = sqlx::query_as::<_, ActivityLogEntity>(&format!(
            r#"
            INSERT INTO activity_logs (activity_type, message, username, jellyfin_user_id, invite_code, created_by, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ACTIVITY_COLUMNS}
            "#,
        ))
        .bind(entry.activity_type.as_str())
        .bind(&entry.message)
        .bind(&entry.username)
        .bind(&entry.jellyfin_user_id)
        .bind(&entry.invite_code)
        .bind(entry.created_by)
        .bind(&entry.metadata)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Page through activity rows newest first. The cursor is the
    /// `(created_at, id)` pair of the last row on the previous page;
    /// the composite keyset keeps pages stable when timestamps collide.
    pub async fn list_page(
        &self,
        after: Option<(DateTime<Utc>, i64)>,
        activity_type: Option<&str>,
        limit: i64,
    ) -> Result<Vec<ActivityLogEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_activity_page");
        let result = match after {
            Some((cursor_at, cursor_id)) => {
                sqlx::query_as::<_, ActivityLogEntity>(&format!(
                    r#"
                    SELECT {ACTIVITY_COLUMNS} FROM activity_logs
                    WHERE (created_at, id) < ($1, $2)
                      AND ($3::text IS NULL OR activity_type = $3)
                    ORDER BY created_at DESC, id DESC
                    LIMIT $4
                    "#,
                ))
                .bind(cursor_at)
                .bind(cursor_id)
                .bind(activity_type)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, ActivityLogEntity>(&format!(
                    r#"
                    SELECT {ACTIVITY_COLUMNS} FROM activity_logs
                    WHERE ($1::text IS NULL OR activity_type = $1)
                    ORDER BY created_at DESC, id DESC
                    LIMIT $2
                    "#,
                ))
                .bind(activity_type)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        };
        timer.record();
        result
    }

    pub async fn count(&self, activity_type: Option<&str>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_activity");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM activity_logs WHERE ($1::text IS NULL OR activity_type = $1)",
        )
        .bind(activity_type)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
