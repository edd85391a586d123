//! Poll a running server over its JSON API
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::ResponseSource;
use crate::api::public::events::EventWithResponses;
use crate::schedule::error::Result;
use crate::schedule::{Event, ResponseMap, ScheduleError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct HttpSource {
    client: reqwest::Client,
    api_base_url: String,
}

impl HttpSource {
    pub fn new(api_base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Map an error status from the server back onto the error it was
/// rendered from
fn error_for_status(status: StatusCode, message: String) -> ScheduleError {
    // Server messages carry the display prefix of the variant
    let prefix = variant_for_status(status, String::new()).to_string();
    let message = match message.strip_prefix(&prefix) {
        Some(rest) => rest.to_string(),
        None => message,
    };
    variant_for_status(status, message)
}

fn variant_for_status(status: StatusCode, message: String) -> ScheduleError {
    match status {
        StatusCode::BAD_REQUEST => ScheduleError::Validation(message),
        StatusCode::NOT_FOUND => ScheduleError::NotFound(message),
        StatusCode::CONFLICT => ScheduleError::TransactionFailure(message),
        _ => ScheduleError::StorageUnavailable(message),
    }
}

#[async_trait]
impl ResponseSource for HttpSource {
    async fn fetch(&self, event_id: &str) -> Result<(Event, ResponseMap)> {
        let url = format!(
            "{}/api/events/{}/with-responses",
            self.api_base_url, event_id
        );

        let resp = self
            .client
            .get(&url)
            .header("Content-Type", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| ScheduleError::StorageUnavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = match resp.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => format!("Request to {} failed with {}", url, status),
            };
            return Err(error_for_status(status, message));
        }

        let body: EventWithResponses = resp
            .json()
            .await
            .map_err(|e| ScheduleError::StorageUnavailable(e.to_string()))?;

        Ok((body.event, body.event_data.responses))
    }
}
