//! Background job scheduler and job implementations.

mod expire_accounts;
mod pool_metrics;
mod scheduler;

pub use expire_accounts::ExpireAccountsJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
