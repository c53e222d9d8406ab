use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, require_admin, require_auth, security_headers_middleware,
    trace_id,
};
use crate::routes::{activity, auth, health, invites, profiles, roles, system, users};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub http: reqwest::Client,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        pool,
        config: config.clone(),
        http: reqwest::Client::new(),
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/auth/login", post(auth::login))
        .route("/api/invites/:code/info", get(invites::invite_info))
        .route("/api/invites/:code/redeem", post(invites::redeem_invite));

    // Read routes (any valid session)
    let authed_routes = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/users", get(users::list_users))
        .route("/api/users/:id", get(users::get_user))
        .route("/api/users/:id/favorites", get(users::favorites))
        .route("/api/users/:id/history", get(users::watch_history))
        .route("/api/invites", get(invites::list_invites))
        .route("/api/user-profiles", get(profiles::list_profiles))
        .route("/api/user-roles", get(roles::list_roles))
        .route("/api/activity", get(activity::list_activity))
        .route("/api/connection-status", get(system::connection_status))
        .route("/api/system/status", get(system::system_status))
        .route("/api/system/settings", get(system::get_settings))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Mutating routes (admin session required)
    let admin_routes = Router::new()
        .route("/api/users", post(users::create_user))
        .route(
            "/api/users/:id",
            put(users::update_user).delete(users::delete_user),
        )
        .route("/api/invites", post(invites::create_invite))
        .route(
            "/api/invites/:id",
            put(invites::update_invite).delete(invites::revoke_invite),
        )
        .route("/api/user-profiles", post(profiles::create_profile))
        .route(
            "/api/user-profiles/:id",
            put(profiles::update_profile).delete(profiles::delete_profile),
        )
        .route(
            "/api/user-profiles/:id/default",
            post(profiles::set_default_profile),
        )
        .route("/api/user-roles", post(roles::create_role))
        .route(
            "/api/user-roles/:id",
            put(roles::update_role).delete(roles::delete_role),
        )
        .route("/api/user-roles/:id/default", post(roles::set_default_role))
        .route("/api/connect", post(system::connect))
        .route("/api/disconnect", post(system::disconnect))
        .route("/api/validate-url", post(system::validate_url))
        .route("/api/system/settings", put(system::update_settings))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(public_routes)
        .merge(authed_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
