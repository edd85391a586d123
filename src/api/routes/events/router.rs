//! Router for the events API

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::schedule::{Event, EventSummary, service};

type SharedState = Arc<AppState>;

// Create event endpoint
async fn create_event(
    State(state): State<SharedState>,
    Json(body): Json<public::CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let today = Utc::now().date_naive();
    let event =
        service::create_event(&state.store, body, state.config.event_ttl_days, today).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn get_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let event = service::get_event(&state.store, &id).await?;
    Ok(Json(event))
}

// Edit event endpoint. Roster and date changes are reconciled against
// existing responses.
async fn update_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<public::UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    let today = Utc::now().date_naive();
    let event = service::update_event(&state.store, &id, body, today).await?;
    Ok(Json(event))
}

async fn delete_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<public::DeleteResponse>, ApiError> {
    service::delete_event(&state.store, &id).await?;
    Ok(Json(public::DeleteResponse { success: true }))
}

async fn check_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<public::CheckResponse>, ApiError> {
    let exists = service::event_exists(&state.store, &id).await?;
    Ok(Json(public::CheckResponse { exists }))
}

async fn event_with_responses(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<public::EventWithResponses>, ApiError> {
    let (event, responses) = service::get_event_with_responses(&state.store, &id).await?;
    Ok(Json(public::EventWithResponses::new(event, responses)))
}

async fn event_summary(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<EventSummary>, ApiError> {
    let summary = service::get_event_summary(&state.store, &id).await?;
    Ok(Json(summary))
}

/// Create the events router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(create_event))
        .route(
            "/{id}",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/{id}/check", get(check_event))
        .route("/{id}/with-responses", get(event_with_responses))
        .route("/{id}/summary", get(event_summary))
}
