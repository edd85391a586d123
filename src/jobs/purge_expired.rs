use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;

use super::PeriodicJob;
use crate::core::AppConfig;
use crate::schedule::{ScheduleStore, SqliteStore};

/// Deletes events, and their responses, once they pass `expires_at`
#[derive(Default, Debug)]
pub struct PurgeExpiredEvents;

#[async_trait]
impl PeriodicJob for PurgeExpiredEvents {
    fn interval(&self) -> Duration {
        // Run hourly
        Duration::from_secs(60 * 60)
    }

    async fn run_job(&self, _config: &AppConfig, store: &SqliteStore) {
        match store.purge_expired(Utc::now()).await {
            Ok(0) => tracing::debug!("No expired events to purge"),
            Ok(count) => tracing::info!("Purged {} expired events", count),
            Err(err) => tracing::error!("Failed to purge expired events: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::memory_db;
    use crate::schedule::{Event, ReconcilePlan};
    use chrono::{Duration as ChronoDuration, NaiveDate};

    fn event(id: &str, expires_in: ChronoDuration) -> Event {
        let now = Utc::now();
        Event {
            id: id.to_string(),
            title: "Dinner".to_string(),
            description: None,
            dates: vec![NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()],
            participants: vec!["A".to_string()],
            created_at: now - ChronoDuration::days(100),
            expires_at: now + expires_in,
        }
    }

    #[tokio::test]
    async fn it_purges_only_expired_events() {
        let store = SqliteStore::new(memory_db().await.unwrap());
        let expired = event("expired", ChronoDuration::days(-1));
        let live = event("live", ChronoDuration::days(1));
        let plan = ReconcilePlan::default();
        store.insert_event(expired, plan.clone()).await.unwrap();
        store.insert_event(live, plan).await.unwrap();

        let config = AppConfig::with_storage_path("./");
        PurgeExpiredEvents.run_job(&config, &store).await;

        assert!(!store.event_exists("expired").await.unwrap());
        assert!(store.event_exists("live").await.unwrap());
    }
}
