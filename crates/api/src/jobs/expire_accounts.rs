//! Periodic account-expiry sweep.
//!
//! Bounds enforcement latency independent of traffic: the lazy on-access
//! path handles accounts the dashboard looks at, this job handles the rest.
//! Also prunes expired sessions.

use chrono::Utc;
use persistence::repositories::{AppUserRepository, SessionRepository};
use reqwest::Client;
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::jobs::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_account_expired;
use crate::services::connection::connected_client;
use crate::services::expiry::enforce_expiry;
use crate::services::jellyfin::JellyfinError;

pub struct ExpireAccountsJob {
    pool: PgPool,
    http: Client,
    sweep_minutes: u64,
}

impl ExpireAccountsJob {
    pub fn new(pool: PgPool, http: Client, sweep_minutes: u64) -> Self {
        Self {
            pool,
            http,
            sweep_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for ExpireAccountsJob {
    fn name(&self) -> &'static str {
        "expire_accounts"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.sweep_minutes)
    }

    async fn execute(&self) -> Result<(), String> {
        let now = Utc::now();

        let sessions = SessionRepository::new(self.pool.clone());
        let pruned = sessions
            .delete_expired(now)
            .await
            .map_err(|e| format!("session pruning failed: {e}"))?;
        if pruned > 0 {
            debug!(pruned, "Pruned expired sessions");
        }

        let app_users = AppUserRepository::new(self.pool.clone());
        let expired = app_users
            .list_expired(now)
            .await
            .map_err(|e| format!("expired account scan failed: {e}"))?;
        if expired.is_empty() {
            return Ok(());
        }

        let client = match connected_client(&self.pool, &self.http).await {
            Ok(client) => client,
            Err(JellyfinError::NotConnected) => {
                warn!(
                    pending = expired.len(),
                    "Expired accounts pending but media server is not connected"
                );
                return Ok(());
            }
            Err(e) => return Err(format!("media server client unavailable: {e}")),
        };

        let mut failures = 0usize;
        for account in &expired {
            match enforce_expiry(&self.pool, &client, account).await {
                Ok(true) => record_account_expired(),
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        username = %account.username,
                        error = %e,
                        "Failed to disable expired account"
                    );
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            Err(format!("{failures} of {} accounts failed", expired.len()))
        } else {
            Ok(())
        }
    }
}
