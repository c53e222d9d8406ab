//! Activity feed endpoint.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use domain::models::activity::{ActivityEntry, ActivityPage};
use persistence::repositories::{ActivityLogRepository, SettingsRepository};
use shared::pagination::{decode_cursor, encode_cursor};

use crate::app::AppState;
use crate::error::ApiError;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub cursor: Option<String>,
    pub limit: Option<i64>,
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
}

/// GET /api/activity
///
/// Newest first, keyset-paginated. The cursor is opaque to clients.
pub async fn list_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityPage>, ApiError> {
    let settings = SettingsRepository::new(state.pool.clone());
    if !settings.get_settings().await?.activity_log_enabled {
        return Err(ApiError::Forbidden("Activity log is disabled".into()));
    }

    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(ApiError::Validation(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    let after = match query.cursor.as_deref() {
        Some(cursor) => Some(
            decode_cursor(cursor).map_err(|e| ApiError::Validation(e.to_string()))?,
        ),
        None => None,
    };

    let activity = ActivityLogRepository::new(state.pool.clone());
    // One extra row tells us whether another page exists.
    let mut rows = activity
        .list_page(after, query.activity_type.as_deref(), limit + 1)
        .await?;

    let next_cursor = if rows.len() as i64 > limit {
        rows.truncate(limit as usize);
        rows.last()
            .map(|row| encode_cursor(row.created_at, row.id))
    } else {
        None
    };

    let data: Vec<ActivityEntry> = rows.into_iter().map(ActivityEntry::from).collect();
    Ok(Json(ActivityPage { data, next_cursor }))
}
