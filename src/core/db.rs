use std::path::Path;

use rusqlite::Connection as SyncConnection;
use tokio_rusqlite::Connection;

const DB_FILE_NAME: &str = "datepoll.sqlite";
const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    dates TEXT NOT NULL,
    participants TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS responses (
    id TEXT PRIMARY KEY,
    event_id TEXT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    participant_name TEXT NOT NULL
        CHECK (length(participant_name) BETWEEN 1 AND 20),
    date TEXT NOT NULL,
    status TEXT NOT NULL
        CHECK (status IN ('未回答', '◯', '×', '△')),
    created_at TEXT NOT NULL,
    UNIQUE (event_id, participant_name, date)
);
";

const INDICES: &str = r"
CREATE INDEX IF NOT EXISTS idx_responses_event_id ON responses(event_id);
CREATE INDEX IF NOT EXISTS idx_events_expires_at ON events(expires_at);
";

/// Open the database stored in directory `db_path`
pub async fn async_db(db_path: &str) -> Result<Connection, tokio_rusqlite::Error> {
    let db = Connection::open(Path::new(db_path).join(DB_FILE_NAME)).await?;
    configure(&db).await?;
    Ok(db)
}

/// Open a private in-memory database with the schema already created
pub async fn memory_db() -> Result<Connection, tokio_rusqlite::Error> {
    let db = Connection::open_in_memory().await?;
    configure(&db).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}

async fn configure(db: &Connection) -> Result<(), tokio_rusqlite::Error> {
    db.call(|conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
        Ok(())
    })
    .await
}

/// Create all tables and indices
pub fn initialize_db(conn: &SyncConnection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)?;
    conn.execute_batch(INDICES)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

/// Bring an existing database up to the current schema version. Safe
/// to run more than once.
pub fn migrate_db(conn: &SyncConnection) -> Result<(), rusqlite::Error> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if version >= SCHEMA_VERSION {
        tracing::debug!("Schema already at version {}", version);
        return Ok(());
    }
    tracing::info!("Migrating schema from version {} to {}", version, SCHEMA_VERSION);
    initialize_db(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn it_initializes_and_migrates_idempotently() {
        let db = memory_db().await.unwrap();
        let version = db
            .call(|conn| {
                migrate_db(conn)?;
                migrate_db(conn)?;
                let v: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
                Ok(v)
            })
            .await
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn it_rejects_unknown_status_tokens() {
        let db = memory_db().await.unwrap();
        let result = db
            .call(|conn| {
                conn.execute(
                    "INSERT INTO events (id, title, dates, participants, created_at, expires_at)
                     VALUES ('e1', 't', '[]', '[]', 'now', 'later')",
                    [],
                )?;
                conn.execute(
                    "INSERT INTO responses (id, event_id, participant_name, date, status, created_at)
                     VALUES ('r1', 'e1', 'A', '2025-06-01', 'yes', 'now')",
                    [],
                )?;
                Ok(())
            })
            .await;
        assert!(result.is_err());
    }
}
