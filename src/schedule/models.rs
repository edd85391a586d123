//! Events, responses and the inputs that change them
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::status::ResponseStatus;

pub const DEFAULT_TITLE: &str = "Schedule Adjustment";

/// Participant name -> date -> status
pub type ResponseMap = BTreeMap<String, BTreeMap<NaiveDate, ResponseStatus>>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub dates: Vec<NaiveDate>,
    pub participants: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Event {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// One participant's answer for one candidate date
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    pub event_id: String,
    pub participant_name: String,
    pub date: NaiveDate,
    pub status: ResponseStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseUpdate {
    pub participant_name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub status: ResponseStatus,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub dates: Vec<NaiveDate>,
    pub participants: Vec<String>,
}

/// Partial update of an event. A field that is `None` is left alone.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    // Distinguishes an absent field from an explicit `null`, which
    // clears the description
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub dates: Option<Vec<NaiveDate>>,
    pub participants: Option<Vec<String>>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.dates.is_none()
            && self.participants.is_none()
    }
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_distinguishes_null_from_missing_description() {
        let patch: EventPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(patch.description, Some(None));
        assert!(!patch.is_empty());

        let patch: EventPatch = serde_json::from_str(r#"{"title": "Lunch"}"#).unwrap();
        assert_eq!(patch.description, None);

        let patch: EventPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn it_defaults_missing_status_to_no_response() {
        let update: ResponseUpdate =
            serde_json::from_str(r#"{"participant_name": "A", "date": "2025-06-01"}"#).unwrap();
        assert_eq!(update.status, ResponseStatus::NoResponse);
    }

    #[test]
    fn it_rejects_malformed_dates() {
        let result: Result<ResponseUpdate, _> = serde_json::from_str(
            r#"{"participant_name": "A", "date": "2025-13-01", "status": "◯"}"#,
        );
        assert!(result.is_err());
    }
}
