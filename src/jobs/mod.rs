//! Background jobs that run on a fixed interval
use std::time::Duration;

use async_trait::async_trait;

use crate::core::AppConfig;
use crate::schedule::SqliteStore;

mod purge_expired;

pub use purge_expired::PurgeExpiredEvents;

#[async_trait]
pub trait PeriodicJob: Send + Sync + 'static {
    fn interval(&self) -> Duration;

    async fn run_job(&self, config: &AppConfig, store: &SqliteStore);
}

/// Run `job` forever in its own tokio task. The first run happens
/// immediately.
pub fn spawn_periodic_job<J: PeriodicJob + std::fmt::Debug>(
    config: AppConfig,
    store: SqliteStore,
    job: J,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(job.interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            tracing::debug!("Running job {:?}", job);
            job.run_job(&config, &store).await;
        }
    })
}
