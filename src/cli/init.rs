use crate::core::db::{async_db, initialize_db};
use anyhow::{Context, Result};
use std::fs;

pub async fn run(db_path: &str) -> Result<()> {
    println!("Initializing db...");
    fs::create_dir_all(db_path)
        .unwrap_or_else(|err| println!("Ignoring db directory create failed: {}", err));

    let db = async_db(db_path)
        .await
        .context("Failed to connect to db")?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await
    .context("DB initialization failed")?;
    println!("Finished initializing db");

    Ok(())
}
