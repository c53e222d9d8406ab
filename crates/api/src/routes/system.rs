//! Connection management, settings, and system status endpoints.

use axum::{extract::State, Extension, Json};
use chrono::Utc;
use tracing::{info, warn};
use validator::Validate;

use domain::models::activity::{ActivityType, NewActivity};
use domain::models::settings::{
    AppSettings, ConnectRequest, ConnectionStatusResponse, SystemStatusResponse,
    UpdateSettingsRequest, ValidateUrlRequest, ValidateUrlResponse,
};
use persistence::repositories::{
    ActivityLogRepository, AppUserRepository, InviteRepository, SettingsRepository,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::services::connection::connected_client;
use crate::services::jellyfin::JellyfinClient;

/// GET /api/connection-status
///
/// Stored connection state plus a live reachability probe.
pub async fn connection_status(
    State(state): State<AppState>,
) -> Result<Json<ConnectionStatusResponse>, ApiError> {
    let settings = SettingsRepository::new(state.pool.clone());
    let credentials = settings.get_credentials().await?;

    let base_url = credentials.as_ref().map(|c| c.base_url.clone());
    let stored_connected = credentials
        .as_ref()
        .is_some_and(|c| c.connected && c.access_token.is_some());

    if !stored_connected {
        return Ok(Json(ConnectionStatusResponse {
            connected: false,
            base_url,
            server_name: None,
            version: None,
        }));
    }

    match connected_client(&state.pool, &state.http).await {
        Ok(client) => match client.public_system_info().await {
            Ok(info) => Ok(Json(ConnectionStatusResponse {
                connected: true,
                base_url,
                server_name: Some(info.server_name),
                version: Some(info.version),
            })),
            Err(e) => {
                warn!(error = %e, "Connection probe failed");
                Ok(Json(ConnectionStatusResponse {
                    connected: false,
                    base_url,
                    server_name: None,
                    version: None,
                }))
            }
        },
        Err(_) => Ok(Json(ConnectionStatusResponse {
            connected: false,
            base_url,
            server_name: None,
            version: None,
        })),
    }
}

/// POST /api/connect
///
/// Authenticates against the media server and stores the resulting admin
/// token. The presented account must be a server administrator.
pub async fn connect(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<ConnectRequest>,
) -> Result<Json<ConnectionStatusResponse>, ApiError> {
    request.validate()?;

    let client = JellyfinClient::unauthenticated(state.http.clone(), request.url.clone());
    let info = client.public_system_info().await.map_err(ApiError::from)?;

    let auth = client
        .authenticate_by_name(&request.username, &request.password)
        .await
        .map_err(|e| ApiError::Unauthorized(format!("Media server rejected credentials: {e}")))?;

    if !auth.user.policy.is_administrator {
        return Err(ApiError::Forbidden(
            "Connection account must be a server administrator".into(),
        ));
    }

    let base_url = request.url.trim_end_matches('/').to_string();
    let settings = SettingsRepository::new(state.pool.clone());
    settings
        .save_credentials(&base_url, &request.username, &auth.access_token)
        .await?;

    info!(base_url = %base_url, server = %info.server_name, "Connected to media server");
    append_activity(
        &state,
        NewActivity::new(
            ActivityType::ServerConnected,
            format!("Connected to {} ({})", info.server_name, base_url),
        )
        .by(current.app_user_id),
    )
    .await;

    Ok(Json(ConnectionStatusResponse {
        connected: true,
        base_url: Some(base_url),
        server_name: Some(info.server_name),
        version: Some(info.version),
    }))
}

/// POST /api/disconnect
///
/// Drops the stored token. The base URL stays for reconnecting.
pub async fn disconnect(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ConnectionStatusResponse>, ApiError> {
    let settings = SettingsRepository::new(state.pool.clone());
    settings.clear_credentials().await?;
    let base_url = settings.get_credentials().await?.map(|c| c.base_url);

    info!(disconnected_by = %current.username, "Disconnected from media server");
    append_activity(
        &state,
        NewActivity::new(
            ActivityType::ServerDisconnected,
            "Disconnected from media server".to_string(),
        )
        .by(current.app_user_id),
    )
    .await;

    Ok(Json(ConnectionStatusResponse {
        connected: false,
        base_url,
        server_name: None,
        version: None,
    }))
}

/// POST /api/validate-url
///
/// Probes a candidate URL. Unreachable servers yield `valid: false`, not an
/// error response.
pub async fn validate_url(
    State(state): State<AppState>,
    Json(request): Json<ValidateUrlRequest>,
) -> Result<Json<ValidateUrlResponse>, ApiError> {
    request.validate()?;

    let client = JellyfinClient::unauthenticated(state.http.clone(), request.url);
    let response = match client.public_system_info().await {
        Ok(info) => ValidateUrlResponse {
            valid: true,
            server_name: Some(info.server_name),
            version: Some(info.version),
        },
        Err(_) => ValidateUrlResponse {
            valid: false,
            server_name: None,
            version: None,
        },
    };
    Ok(Json(response))
}

/// GET /api/system/status
pub async fn system_status(
    State(state): State<AppState>,
) -> Result<Json<SystemStatusResponse>, ApiError> {
    let database_connected = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();

    let jellyfin_connected = match connected_client(&state.pool, &state.http).await {
        Ok(client) => client.public_system_info().await.is_ok(),
        Err(_) => false,
    };

    let app_users = AppUserRepository::new(state.pool.clone());
    let invites = InviteRepository::new(state.pool.clone());
    let activity = ActivityLogRepository::new(state.pool.clone());

    let managed_user_count = app_users.list_linked().await?.len() as i64;
    let active_invite_count = invites.count_redeemable(Utc::now()).await?;
    let activity_count = activity.count(None).await?;

    Ok(Json(SystemStatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        database_connected,
        jellyfin_connected,
        managed_user_count,
        active_invite_count,
        activity_count,
    }))
}

/// GET /api/system/settings
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<AppSettings>, ApiError> {
    let settings = SettingsRepository::new(state.pool.clone());
    Ok(Json(settings.get_settings().await?))
}

/// PUT /api/system/settings
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<AppSettings>, ApiError> {
    request.validate()?;

    let repo = SettingsRepository::new(state.pool.clone());
    let mut settings = repo.get_settings().await?;
    request.apply(&mut settings);
    repo.save_settings(&settings).await?;

    append_activity(
        &state,
        NewActivity::new(
            ActivityType::SettingsUpdated,
            "Dashboard settings updated".to_string(),
        )
        .by(current.app_user_id),
    )
    .await;

    Ok(Json(settings))
}

async fn append_activity(state: &AppState, entry: NewActivity) {
    let activity = ActivityLogRepository::new(state.pool.clone());
    if let Err(e) = activity.append(entry).await {
        warn!(error = %e, "Failed to append activity entry");
    }
}
