//! Router for the responses API

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::schedule::{Response, ResponseMap, service};

type SharedState = Arc<AppState>;

// Formatted responses of an event as participant -> date -> status
async fn get_responses(
    State(state): State<SharedState>,
    Path(event_id): Path<String>,
) -> Result<Json<ResponseMap>, ApiError> {
    let responses = service::get_responses(&state.store, &event_id).await?;
    Ok(Json(responses))
}

async fn update_response(
    State(state): State<SharedState>,
    Path(event_id): Path<String>,
    Json(body): Json<public::UpdateResponseRequest>,
) -> Result<Json<Response>, ApiError> {
    let response = service::update_response(&state.store, &event_id, body).await?;
    Ok(Json(response))
}

// All or nothing, the formatted map is returned only when every update
// was stored
async fn update_responses(
    State(state): State<SharedState>,
    Path(event_id): Path<String>,
    Json(body): Json<public::BatchUpdateRequest>,
) -> Result<Json<ResponseMap>, ApiError> {
    let responses =
        service::update_responses(&state.store, &event_id, body.into_updates()).await?;
    Ok(Json(responses))
}

/// Create the responses router
pub fn router() -> Router<SharedState> {
    Router::new().route(
        "/{event_id}",
        get(get_responses)
            .patch(update_response)
            .post(update_responses),
    )
}
