//! Storage boundary for events and responses
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::Result;
use super::models::{Event, Response, ResponseUpdate};
use super::reconcile::ReconcilePlan;

/// Persistence for events and their responses.
///
/// Every method that takes a `ReconcilePlan` or a list of updates must
/// apply it as a single transaction: either everything is visible
/// afterwards or nothing is.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn event_exists(&self, event_id: &str) -> Result<bool>;

    async fn get_event(&self, event_id: &str) -> Result<Event>;

    /// Insert a new event together with its seeded responses
    async fn insert_event(&self, event: Event, plan: ReconcilePlan) -> Result<Event>;

    /// Apply the plan and overwrite the stored event
    async fn update_event(&self, event: Event, plan: ReconcilePlan) -> Result<Event>;

    /// Delete an event and all of its responses
    async fn delete_event(&self, event_id: &str) -> Result<()>;

    /// Delete every event that expired before `now`. Returns the number
    /// of events removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize>;

    /// All responses of an event ordered by participant then date
    async fn get_responses(&self, event_id: &str) -> Result<Vec<Response>>;

    async fn apply_plan(&self, event_id: &str, plan: ReconcilePlan) -> Result<()>;

    /// Update the status of a cell, creating the row if it is missing
    async fn upsert_response(&self, event_id: &str, update: ResponseUpdate) -> Result<Response>;

    async fn upsert_responses(&self, event_id: &str, updates: Vec<ResponseUpdate>) -> Result<()>;
}
