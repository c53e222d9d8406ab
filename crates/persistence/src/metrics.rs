//! Query timing and pool occupancy metrics.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::{Duration, Instant};
use tracing::warn;

/// Queries slower than this get a warning log on top of the histogram.
const SLOW_QUERY: Duration = Duration::from_millis(250);

/// Times one repository query and feeds the duration histogram.
///
/// Query names are compile-time literals so the label set stays bounded.
///
/// ```ignore
/// let timer = QueryTimer::new("find_invite_by_code");
/// let result = sqlx::query_as::<_, InviteEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        let elapsed = self.start.elapsed();
        histogram!(
            "database_query_duration_seconds",
            "query" => self.query_name
        )
        .record(elapsed.as_secs_f64());

        if elapsed >= SLOW_QUERY {
            warn!(
                query = self.query_name,
                elapsed_ms = elapsed.as_millis() as u64,
                "Slow database query"
            );
        }
    }
}

/// Point-in-time pool occupancy.
#[derive(Debug, Clone, Copy)]
pub struct PoolSnapshot {
    pub total: u32,
    pub idle: usize,
    pub active: usize,
}

/// Exports pool occupancy gauges and returns the snapshot taken.
pub fn record_pool_metrics(pool: &PgPool) -> PoolSnapshot {
    let total = pool.size();
    let idle = pool.num_idle();
    let snapshot = PoolSnapshot {
        total,
        idle,
        active: (total as usize).saturating_sub(idle),
    };

    gauge!("database_connections_active").set(snapshot.active as f64);
    gauge!("database_connections_idle").set(snapshot.idle as f64);
    gauge!("database_connections_total").set(snapshot.total as f64);

    snapshot
}
