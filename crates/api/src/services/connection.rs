//! Access to the stored media-server connection.

use persistence::repositories::SettingsRepository;
use reqwest::Client;
use sqlx::PgPool;

use crate::services::jellyfin::{JellyfinClient, JellyfinError};

/// Builds an authenticated client from the stored credentials row.
///
/// Fails with `NotConnected` when no connection has been configured or the
/// dashboard has been disconnected.
pub async fn connected_client(pool: &PgPool, http: &Client) -> Result<JellyfinClient, JellyfinError> {
    let settings = SettingsRepository::new(pool.clone());
    let credentials = settings
        .get_credentials()
        .await
        .map_err(|e| JellyfinError::Status {
            status: 500,
            message: format!("credential lookup failed: {e}"),
        })?;

    match credentials {
        Some(row) if row.connected => match row.access_token {
            Some(token) => Ok(JellyfinClient::new(http.clone(), row.base_url, token)),
            None => Err(JellyfinError::NotConnected),
        },
        _ => Err(JellyfinError::NotConnected),
    }
}
