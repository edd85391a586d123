//! Keeps the response rows of an event in step with its roster and
//! date set.
//!
//! Planning is pure: each `plan_*` function compares the old and new
//! lists and returns the rows to seed and the participants/dates whose
//! rows must go. A store then applies the whole plan in one
//! transaction. Seeding never overwrites an existing row, so a
//! participant that survives an edit keeps their answers.
use std::collections::HashSet;
use std::hash::Hash;

use chrono::NaiveDate;
use itertools::iproduct;

use super::error::{Result, ScheduleError};
use super::models::{Event, Response, ResponseUpdate};
use super::store::ScheduleStore;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Cells to create with a `NoResponse` status
    pub seed: Vec<(String, NaiveDate)>,
    /// Participants whose rows are deleted across every date
    pub removed_participants: Vec<String>,
    /// Dates whose rows are deleted across every participant
    pub removed_dates: Vec<NaiveDate>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.seed.is_empty()
            && self.removed_participants.is_empty()
            && self.removed_dates.is_empty()
    }
}

/// Items of `a` missing from `b`, in the order they appear in `a`
fn difference<T: Eq + Hash + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    let b: HashSet<&T> = b.iter().collect();
    a.iter().filter(|i| !b.contains(i)).cloned().collect()
}

fn cross(participants: &[String], dates: &[NaiveDate]) -> Vec<(String, NaiveDate)> {
    iproduct!(participants, dates)
        .map(|(p, d)| (p.clone(), *d))
        .collect()
}

/// One cell per participant and date
pub fn plan_initial(participants: &[String], dates: &[NaiveDate]) -> ReconcilePlan {
    ReconcilePlan {
        seed: cross(participants, dates),
        ..Default::default()
    }
}

pub fn plan_roster_change(
    old_participants: &[String],
    new_participants: &[String],
    existing_dates: &[NaiveDate],
) -> ReconcilePlan {
    let added = difference(new_participants, old_participants);
    ReconcilePlan {
        seed: cross(&added, existing_dates),
        removed_participants: difference(old_participants, new_participants),
        removed_dates: Vec::new(),
    }
}

/// Removed dates lose their rows the same way removed participants do
pub fn plan_date_change(
    old_dates: &[NaiveDate],
    new_dates: &[NaiveDate],
    existing_participants: &[String],
) -> ReconcilePlan {
    let added = difference(new_dates, old_dates);
    ReconcilePlan {
        seed: cross(existing_participants, &added),
        removed_participants: Vec::new(),
        removed_dates: difference(old_dates, new_dates),
    }
}

/// Plan for a single edit that may change the roster, the dates or
/// both. Seeding is computed against the final lists: new participants
/// get every final date and the participants that were already there
/// get only the new dates, so the (new participant, new date) cell is
/// seeded exactly once.
pub fn plan_event_edit(
    current: &Event,
    participants: Option<&[String]>,
    dates: Option<&[NaiveDate]>,
) -> ReconcilePlan {
    let final_participants = participants.unwrap_or(current.participants.as_slice());
    let final_dates = dates.unwrap_or(current.dates.as_slice());

    let added_participants = difference(final_participants, &current.participants);
    let kept_participants = difference(final_participants, &added_participants);
    let added_dates = difference(final_dates, &current.dates);

    let mut seed = cross(&added_participants, final_dates);
    seed.extend(cross(&kept_participants, &added_dates));

    ReconcilePlan {
        seed,
        removed_participants: difference(&current.participants, final_participants),
        removed_dates: difference(&current.dates, final_dates),
    }
}

pub async fn seed_initial_responses<S: ScheduleStore + ?Sized>(
    store: &S,
    event_id: &str,
    participants: &[String],
    dates: &[NaiveDate],
) -> Result<()> {
    let plan = plan_initial(participants, dates);
    if plan.is_empty() {
        return Ok(());
    }
    tracing::debug!("Seeding {} responses for event {}", plan.seed.len(), event_id);
    store.apply_plan(event_id, plan).await
}

pub async fn apply_roster_change<S: ScheduleStore + ?Sized>(
    store: &S,
    event_id: &str,
    old_participants: &[String],
    new_participants: &[String],
    existing_dates: &[NaiveDate],
) -> Result<()> {
    let plan = plan_roster_change(old_participants, new_participants, existing_dates);
    if plan.is_empty() {
        return Ok(());
    }
    tracing::debug!(
        "Roster change for event {}: removing {:?}, seeding {} cells",
        event_id,
        plan.removed_participants,
        plan.seed.len()
    );
    store.apply_plan(event_id, plan).await
}

pub async fn apply_date_change<S: ScheduleStore + ?Sized>(
    store: &S,
    event_id: &str,
    old_dates: &[NaiveDate],
    new_dates: &[NaiveDate],
    existing_participants: &[String],
) -> Result<()> {
    let plan = plan_date_change(old_dates, new_dates, existing_participants);
    if plan.is_empty() {
        return Ok(());
    }
    tracing::debug!(
        "Date change for event {}: removing {:?}, seeding {} cells",
        event_id,
        plan.removed_dates,
        plan.seed.len()
    );
    store.apply_plan(event_id, plan).await
}

/// Upsert one cell. Only a missing event is an error, a missing row is
/// created.
pub async fn update_single_response<S: ScheduleStore + ?Sized>(
    store: &S,
    event_id: &str,
    update: ResponseUpdate,
) -> Result<Response> {
    if !store.event_exists(event_id).await? {
        return Err(ScheduleError::event_not_found(event_id));
    }
    store.upsert_response(event_id, update).await
}

/// Upsert many cells at once. Either every update lands or none do.
pub async fn update_batch<S: ScheduleStore + ?Sized>(
    store: &S,
    event_id: &str,
    updates: Vec<ResponseUpdate>,
) -> Result<()> {
    if !store.event_exists(event_id).await? {
        return Err(ScheduleError::event_not_found(event_id));
    }
    if updates.is_empty() {
        return Ok(());
    }
    tracing::debug!("Applying {} response updates to event {}", updates.len(), event_id);
    store.upsert_responses(event_id, updates).await
}
