use anyhow::{Context, Result};

use crate::core::AppConfig;
use crate::core::db::async_db;
use crate::core::logging::{cli_filter, init_tracing};
use crate::jobs::{PeriodicJob, PurgeExpiredEvents};
use crate::schedule::SqliteStore;

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum JobId {
    PurgeExpiredEvents,
}

pub async fn run(id: JobId, config: &AppConfig) -> Result<()> {
    init_tracing(&cli_filter());

    let db = async_db(&config.db_path)
        .await
        .context("Failed to connect to db")?;
    let store = SqliteStore::new(db);

    let job: Box<dyn PeriodicJob> = match id {
        JobId::PurgeExpiredEvents => Box::new(PurgeExpiredEvents),
    };

    println!("Running job: {:?}", id);
    job.run_job(config, &store).await;
    println!("Job completed");

    Ok(())
}
