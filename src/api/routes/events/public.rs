//! Public types for the events API
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schedule::{Event, ResponseMap};

pub use crate::schedule::{EventPatch as UpdateEventRequest, NewEvent as CreateEventRequest};

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    pub exists: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// The parts of an event a grid view needs, alongside its responses
#[derive(Debug, Serialize, Deserialize)]
pub struct EventData {
    pub dates: Vec<NaiveDate>,
    pub participants: Vec<String>,
    pub responses: ResponseMap,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventWithResponses {
    pub event: Event,
    #[serde(rename = "eventData")]
    pub event_data: EventData,
}

impl EventWithResponses {
    pub fn new(event: Event, responses: ResponseMap) -> Self {
        let event_data = EventData {
            dates: event.dates.clone(),
            participants: event.participants.clone(),
            responses,
        };
        Self { event, event_data }
    }
}
