//! HTTP middleware components.

pub mod auth;
pub mod logging;
pub mod metrics;
pub mod security_headers;
pub mod trace_id;

pub use auth::{require_admin, require_auth, CurrentUser};
pub use metrics::{
    init_metrics, metrics_handler, metrics_middleware, record_account_expired,
    record_invite_redemption,
};
pub use security_headers::security_headers_middleware;
pub use trace_id::{trace_id, RequestId, REQUEST_ID_HEADER};
