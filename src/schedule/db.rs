//! SQLite backed `ScheduleStore`
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection as SyncConnection, OptionalExtension, Row, params};
use serde::de::DeserializeOwned;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::error::{Result, ScheduleError};
use super::models::{Event, Response, ResponseUpdate};
use super::reconcile::ReconcilePlan;
use super::status::ResponseStatus;
use super::store::ScheduleStore;

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_EVENT: &str = r"
SELECT id, title, description, dates, participants, created_at, expires_at
FROM events
WHERE id = ?1
";

const SELECT_RESPONSE: &str = r"
SELECT id, event_id, participant_name, date, status, created_at
FROM responses
WHERE event_id = ?1 AND participant_name = ?2 AND date = ?3
";

const UPSERT_RESPONSE: &str = r"
INSERT INTO responses (id, event_id, participant_name, date, status, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
ON CONFLICT (event_id, participant_name, date) DO UPDATE SET status = excluded.status
";

// Existing cells keep their status
const SEED_RESPONSE: &str = r"
INSERT INTO responses (id, event_id, participant_name, date, status, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
ON CONFLICT (event_id, participant_name, date) DO NOTHING
";

#[derive(Clone)]
pub struct SqliteStore {
    db: Connection,
}

impl SqliteStore {
    pub fn new(db: Connection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &Connection {
        &self.db
    }
}

fn timestamp(ts: &DateTime<Utc>) -> String {
    // Fixed width so timestamps compare correctly as text
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn date_key(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        dates: json_column(row, 3)?,
        participants: json_column(row, 4)?,
        created_at: timestamp_column(row, 5)?,
        expires_at: timestamp_column(row, 6)?,
    })
}

fn response_from_row(row: &Row<'_>) -> rusqlite::Result<Response> {
    Ok(Response {
        id: row.get(0)?,
        event_id: row.get(1)?,
        participant_name: row.get(2)?,
        date: date_column(row, 3)?,
        status: row.get(4)?,
        created_at: timestamp_column(row, 5)?,
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> rusqlite::Result<String> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn event_exists(conn: &SyncConnection, event_id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM events WHERE id = ?1)",
        [event_id],
        |row| row.get(0),
    )
}

fn apply_plan(
    conn: &SyncConnection,
    event_id: &str,
    plan: &ReconcilePlan,
    now: &str,
) -> rusqlite::Result<()> {
    for participant in &plan.removed_participants {
        conn.execute(
            "DELETE FROM responses WHERE event_id = ?1 AND participant_name = ?2",
            params![event_id, participant],
        )?;
    }
    for date in &plan.removed_dates {
        conn.execute(
            "DELETE FROM responses WHERE event_id = ?1 AND date = ?2",
            params![event_id, date_key(date)],
        )?;
    }

    let mut stmt = conn.prepare_cached(SEED_RESPONSE)?;
    for (participant, date) in &plan.seed {
        stmt.execute(params![
            Uuid::new_v4().to_string(),
            event_id,
            participant,
            date_key(date),
            ResponseStatus::NoResponse,
            now,
        ])?;
    }
    Ok(())
}

fn upsert(
    conn: &SyncConnection,
    event_id: &str,
    update: &ResponseUpdate,
    now: &str,
) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare_cached(UPSERT_RESPONSE)?;
    stmt.execute(params![
        Uuid::new_v4().to_string(),
        event_id,
        update.participant_name,
        date_key(&update.date),
        update.status,
        now,
    ])
}

#[async_trait]
impl ScheduleStore for SqliteStore {
    async fn event_exists(&self, event_id: &str) -> Result<bool> {
        let id = event_id.to_owned();
        self.db
            .call(move |conn| Ok(event_exists(conn, &id)?))
            .await
            .map_err(ScheduleError::from_read)
    }

    async fn get_event(&self, event_id: &str) -> Result<Event> {
        let id = event_id.to_owned();
        let event = self
            .db
            .call(move |conn| {
                let event = conn
                    .query_row(SELECT_EVENT, [&id], event_from_row)
                    .optional()?;
                Ok(event)
            })
            .await
            .map_err(ScheduleError::from_read)?;

        event.ok_or_else(|| ScheduleError::event_not_found(event_id))
    }

    async fn insert_event(&self, event: Event, plan: ReconcilePlan) -> Result<Event> {
        let now = timestamp(&event.created_at);
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    r"INSERT INTO events (id, title, description, dates, participants, created_at, expires_at)
                      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        event.id,
                        event.title,
                        event.description,
                        to_json(&event.dates)?,
                        to_json(&event.participants)?,
                        timestamp(&event.created_at),
                        timestamp(&event.expires_at),
                    ],
                )?;
                apply_plan(&tx, &event.id, &plan, &now)?;
                tx.commit()?;
                Ok(event)
            })
            .await
            .map_err(ScheduleError::from_write)
    }

    async fn update_event(&self, event: Event, plan: ReconcilePlan) -> Result<Event> {
        let id = event.id.clone();
        let now = timestamp(&Utc::now());
        let updated = self
            .db
            .call(move |conn| {
                let tx = conn.transaction()?;
                if !event_exists(&tx, &event.id)? {
                    return Ok(None);
                }
                apply_plan(&tx, &event.id, &plan, &now)?;
                tx.execute(
                    r"UPDATE events
                      SET title = ?1, description = ?2, dates = ?3, participants = ?4
                      WHERE id = ?5",
                    params![
                        event.title,
                        event.description,
                        to_json(&event.dates)?,
                        to_json(&event.participants)?,
                        event.id,
                    ],
                )?;
                tx.commit()?;
                Ok(Some(event))
            })
            .await
            .map_err(ScheduleError::from_write)?;

        updated.ok_or_else(|| ScheduleError::event_not_found(&id))
    }

    async fn delete_event(&self, event_id: &str) -> Result<()> {
        let id = event_id.to_owned();
        let deleted = self
            .db
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM responses WHERE event_id = ?1", [&id])?;
                let deleted = tx.execute("DELETE FROM events WHERE id = ?1", [&id])?;
                tx.commit()?;
                Ok(deleted)
            })
            .await
            .map_err(ScheduleError::from_write)?;

        if deleted == 0 {
            return Err(ScheduleError::event_not_found(event_id));
        }
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let cutoff = timestamp(&now);
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "DELETE FROM responses WHERE event_id IN (SELECT id FROM events WHERE expires_at <= ?1)",
                    [&cutoff],
                )?;
                let purged = tx.execute("DELETE FROM events WHERE expires_at <= ?1", [&cutoff])?;
                tx.commit()?;
                Ok(purged)
            })
            .await
            .map_err(ScheduleError::from_write)
    }

    async fn get_responses(&self, event_id: &str) -> Result<Vec<Response>> {
        let id = event_id.to_owned();
        let (rows, skipped) = self
            .db
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r"SELECT id, event_id, participant_name, date, status, created_at
                      FROM responses
                      WHERE event_id = ?1
                      ORDER BY participant_name, date",
                )?;
                let mut rows = Vec::new();
                let mut skipped = 0;
                for row in stmt.query_map([&id], response_from_row)? {
                    match row {
                        Ok(r) => rows.push(r),
                        Err(_) => skipped += 1,
                    }
                }
                Ok((rows, skipped))
            })
            .await
            .map_err(ScheduleError::from_read)?;

        if skipped > 0 {
            tracing::warn!("Skipped {} unreadable responses for event {}", skipped, event_id);
        }
        Ok(rows)
    }

    async fn apply_plan(&self, event_id: &str, plan: ReconcilePlan) -> Result<()> {
        let id = event_id.to_owned();
        let now = timestamp(&Utc::now());
        let applied = self
            .db
            .call(move |conn| {
                let tx = conn.transaction()?;
                if !event_exists(&tx, &id)? {
                    return Ok(false);
                }
                apply_plan(&tx, &id, &plan, &now)?;
                tx.commit()?;
                Ok(true)
            })
            .await
            .map_err(ScheduleError::from_write)?;

        if !applied {
            return Err(ScheduleError::event_not_found(event_id));
        }
        Ok(())
    }

    async fn upsert_response(&self, event_id: &str, update: ResponseUpdate) -> Result<Response> {
        let id = event_id.to_owned();
        let now = timestamp(&Utc::now());
        self.db
            .call(move |conn| {
                upsert(conn, &id, &update, &now)?;
                let response = conn.query_row(
                    SELECT_RESPONSE,
                    params![id, update.participant_name, date_key(&update.date)],
                    response_from_row,
                )?;
                Ok(response)
            })
            .await
            .map_err(ScheduleError::from_write)
    }

    async fn upsert_responses(&self, event_id: &str, updates: Vec<ResponseUpdate>) -> Result<()> {
        let id = event_id.to_owned();
        let now = timestamp(&Utc::now());
        self.db
            .call(move |conn| {
                // Dropping the transaction on the first error rolls back
                // every update before it
                let tx = conn.transaction()?;
                for update in &updates {
                    upsert(&tx, &id, update, &now)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(ScheduleError::from_write)
    }
}
