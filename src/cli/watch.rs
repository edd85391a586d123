use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use super::summary::render_summary;
use crate::core::AppConfig;
use crate::core::db::async_db;
use crate::core::logging::{cli_filter, init_tracing};
use crate::poller::{HttpSource, ResponsePoller, ResponseSource, StoreSource};
use crate::schedule::SqliteStore;

pub async fn run(
    event_id: &str,
    local: bool,
    interval: Option<u64>,
    config: &AppConfig,
) -> Result<()> {
    init_tracing(&cli_filter());

    let source: Arc<dyn ResponseSource> = if local {
        let db = async_db(&config.db_path)
            .await
            .context("Failed to connect to db")?;
        Arc::new(StoreSource::new(SqliteStore::new(db)))
    } else {
        Arc::new(HttpSource::new(&config.api_url))
    };
    let interval = interval
        .map(Duration::from_secs)
        .unwrap_or(config.poll_interval);

    println!("Watching event {} every {:?}", event_id, interval);
    let handle = ResponsePoller::spawn(source, event_id, interval);
    let mut rx = handle.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                if let Some(err) = &snapshot.last_error {
                    eprintln!("Poll failed: {}", err);
                } else if let (Some(event), Some(summary)) = (&snapshot.event, &snapshot.summary) {
                    println!("{}", render_summary(&event.title, summary));
                }
            }
        }
    }

    handle.stop().await;
    println!("Stopped watching");
    Ok(())
}
