//! Settings repository for database operations.
//!
//! Dashboard settings live as one JSON document under a fixed key in the
//! server_config table; upstream credentials live in their own singleton row.

use domain::models::settings::AppSettings;
use sqlx::PgPool;

use crate::entities::JellyfinCredentialsEntity;
use crate::metrics::QueryTimer;

const APP_SETTINGS_KEY: &str = "app_settings";

/// Repository for server configuration and upstream connection state.
#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load dashboard settings, falling back to defaults when the key is
    /// absent or the stored document no longer deserializes.
    pub async fn get_settings(&self) -> Result<AppSettings, sqlx::Error> {
        let timer = QueryTimer::new("get_settings");
        let row = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT value FROM server_config WHERE key = $1",
        )
        .bind(APP_SETTINGS_KEY)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(row?
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default())
    }

    pub async fn save_settings(&self, settings: &AppSettings) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("save_settings");
        let value = serde_json::to_value(settings)
            .map_err(|e| sqlx::Error::Protocol(format!("settings serialization: {e}")))?;
        let result = sqlx::query(
            r#"
            INSERT INTO server_config (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(APP_SETTINGS_KEY)
        .bind(value)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn get_credentials(
        &self,
    ) -> Result<Option<JellyfinCredentialsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("get_jellyfin_credentials");
        let result = sqlx::query_as::<_, JellyfinCredentialsEntity>(
            "SELECT id, base_url, admin_username, access_token, connected, updated_at \
             FROM jellyfin_credentials WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Persist upstream credentials after a successful connect. The table
    /// holds one row; reconnecting overwrites it.
    pub async fn save_credentials(
        &self,
        base_url: &str,
        admin_username: &str,
        access_token: &str,
    ) -> Result<JellyfinCredentialsEntity, sqlx::Error> {
        let timer = QueryTimer::new("save_jellyfin_credentials");
        let result = sqlx::query_as::<_, JellyfinCredentialsEntity>(
            r#"
            INSERT INTO jellyfin_credentials (id, base_url, admin_username, access_token, connected)
            VALUES (1, $1, $2, $3, true)
            ON CONFLICT (id) DO UPDATE
            SET base_url = EXCLUDED.base_url,
                admin_username = EXCLUDED.admin_username,
                access_token = EXCLUDED.access_token,
                connected = true,
                updated_at = NOW()
            RETURNING id, base_url, admin_username, access_token, connected, updated_at
            "#,
        )
        .bind(base_url)
        .bind(admin_username)
        .bind(access_token)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Drop the stored token and mark the connection closed. The base URL is
    /// kept so the connect form can be prefilled.
    pub async fn clear_credentials(&self) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("clear_jellyfin_credentials");
        let result = sqlx::query(
            "UPDATE jellyfin_credentials \
             SET access_token = NULL, connected = false, updated_at = NOW() WHERE id = 1",
        )
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
