//! Periodic export of connection pool gauges.

use sqlx::PgPool;
use tracing::debug;

use crate::jobs::scheduler::{Job, JobFrequency};

pub struct PoolMetricsJob {
    pool: PgPool,
}

impl PoolMetricsJob {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Job for PoolMetricsJob {
    fn name(&self) -> &'static str {
        "pool_metrics"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(30)
    }

    async fn execute(&self) -> Result<(), String> {
        let snapshot = persistence::metrics::record_pool_metrics(&self.pool);
        debug!(
            active = snapshot.active,
            idle = snapshot.idle,
            total = snapshot.total,
            "Pool occupancy"
        );
        Ok(())
    }
}
