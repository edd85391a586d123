//! Event level operations that tie validation, reconciliation and the
//! store together
use chrono::{Duration, NaiveDate, SubsecRound, Utc};
use uuid::Uuid;

use super::aggregate::{EventSummary, build_response_map, summarize_event};
use super::error::{Result, ScheduleError};
use super::models::{
    DEFAULT_TITLE, Event, EventPatch, NewEvent, Response, ResponseMap, ResponseUpdate,
};
use super::reconcile::{plan_event_edit, plan_initial, update_batch, update_single_response};
use super::store::ScheduleStore;
use super::validate::{
    sanitize_participant_name, sanitize_participants, validate_event_id, validate_event_patch,
    validate_new_event, validate_response_update,
};

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Create an event and seed one `NoResponse` cell per participant and
/// date in the same transaction
pub async fn create_event<S: ScheduleStore + ?Sized>(
    store: &S,
    input: NewEvent,
    ttl_days: i64,
    today: NaiveDate,
) -> Result<Event> {
    let input = NewEvent {
        participants: sanitize_participants(&input.participants),
        ..input
    };
    validate_new_event(&input, today)?;

    // Stored timestamps keep microseconds
    let now = Utc::now().trunc_subsecs(6);
    let event = Event {
        id: Uuid::new_v4().to_string(),
        title: non_blank(input.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        description: non_blank(input.description),
        dates: input.dates,
        participants: input.participants,
        created_at: now,
        expires_at: now + Duration::days(ttl_days),
    };
    let plan = plan_initial(&event.participants, &event.dates);

    let event = store.insert_event(event, plan).await?;
    tracing::info!(
        "Created event {} with {} participants and {} dates",
        event.id,
        event.participants.len(),
        event.dates.len()
    );
    Ok(event)
}

pub async fn get_event<S: ScheduleStore + ?Sized>(store: &S, event_id: &str) -> Result<Event> {
    validate_event_id(event_id)?;
    store.get_event(event_id).await
}

pub async fn event_exists<S: ScheduleStore + ?Sized>(store: &S, event_id: &str) -> Result<bool> {
    validate_event_id(event_id)?;
    store.event_exists(event_id).await
}

/// Apply a partial update. Roster and date changes are reconciled
/// against the stored responses in the same transaction as the event
/// update itself.
pub async fn update_event<S: ScheduleStore + ?Sized>(
    store: &S,
    event_id: &str,
    patch: EventPatch,
    today: NaiveDate,
) -> Result<Event> {
    validate_event_id(event_id)?;
    let patch = EventPatch {
        participants: patch.participants.as_deref().map(sanitize_participants),
        ..patch
    };
    validate_event_patch(&patch, today)?;

    let current = store.get_event(event_id).await?;
    let plan = plan_event_edit(
        &current,
        patch.participants.as_deref(),
        patch.dates.as_deref(),
    );

    let EventPatch {
        title,
        description,
        dates,
        participants,
    } = patch;
    let updated = Event {
        title: non_blank(title).unwrap_or_else(|| current.title.clone()),
        description: description.map_or_else(|| current.description.clone(), non_blank),
        dates: dates.unwrap_or_else(|| current.dates.clone()),
        participants: participants.unwrap_or_else(|| current.participants.clone()),
        ..current
    };

    tracing::debug!(
        "Updating event {}: seeding {}, removing participants {:?}, removing dates {:?}",
        event_id,
        plan.seed.len(),
        plan.removed_participants,
        plan.removed_dates
    );
    store.update_event(updated, plan).await
}

pub async fn delete_event<S: ScheduleStore + ?Sized>(store: &S, event_id: &str) -> Result<()> {
    validate_event_id(event_id)?;
    store.delete_event(event_id).await?;
    tracing::info!("Deleted event {}", event_id);
    Ok(())
}

pub async fn get_event_with_responses<S: ScheduleStore + ?Sized>(
    store: &S,
    event_id: &str,
) -> Result<(Event, ResponseMap)> {
    let event = get_event(store, event_id).await?;
    let rows = store.get_responses(event_id).await?;
    Ok((event, build_response_map(&rows)))
}

pub async fn get_responses<S: ScheduleStore + ?Sized>(
    store: &S,
    event_id: &str,
) -> Result<ResponseMap> {
    validate_event_id(event_id)?;
    if !store.event_exists(event_id).await? {
        return Err(ScheduleError::event_not_found(event_id));
    }
    let rows = store.get_responses(event_id).await?;
    Ok(build_response_map(&rows))
}

pub async fn get_event_summary<S: ScheduleStore + ?Sized>(
    store: &S,
    event_id: &str,
) -> Result<EventSummary> {
    let event = get_event(store, event_id).await?;
    let rows = store.get_responses(event_id).await?;
    Ok(summarize_event(&event, &rows))
}

fn prepare_update(update: ResponseUpdate) -> Result<ResponseUpdate> {
    let update = ResponseUpdate {
        participant_name: sanitize_participant_name(&update.participant_name),
        ..update
    };
    validate_response_update(&update)?;
    Ok(update)
}

/// Set the status of one cell
pub async fn update_response<S: ScheduleStore + ?Sized>(
    store: &S,
    event_id: &str,
    update: ResponseUpdate,
) -> Result<Response> {
    validate_event_id(event_id)?;
    let update = prepare_update(update)?;
    update_single_response(store, event_id, update).await
}

/// Set the status of many cells at once and return the resulting grid
pub async fn update_responses<S: ScheduleStore + ?Sized>(
    store: &S,
    event_id: &str,
    updates: Vec<ResponseUpdate>,
) -> Result<ResponseMap> {
    validate_event_id(event_id)?;
    let updates = updates
        .into_iter()
        .map(prepare_update)
        .collect::<Result<Vec<_>>>()?;
    update_batch(store, event_id, updates).await?;
    let rows = store.get_responses(event_id).await?;
    Ok(build_response_map(&rows))
}
