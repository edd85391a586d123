//! API routes module

pub mod events;
pub mod responses;

use std::sync::Arc;

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<AppState>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Event routes
        .nest("/events", events::router())
        // Response routes
        .nest("/responses", responses::router())
}
