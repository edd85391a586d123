//! Checks applied to input at the API boundary before anything reaches
//! the store
use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{Months, NaiveDate};
use regex::Regex;
use uuid::Uuid;

use super::error::{Result, ScheduleError};
use super::models::{EventPatch, NewEvent, ResponseUpdate};

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const MAX_PARTICIPANTS: usize = 20;
pub const MAX_PARTICIPANT_NAME_CHARS: usize = 20;
pub const DATE_WINDOW_MONTHS: u32 = 3;

// Clients have been seen sending names wrapped as `["name"]`
static STRAY_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\[\]"]"#).expect("Invalid participant name pattern"));

fn invalid(msg: impl Into<String>) -> ScheduleError {
    ScheduleError::Validation(msg.into())
}

/// Strip bracket and quote characters left over from a badly encoded
/// array and trim surrounding whitespace
pub fn sanitize_participant_name(raw: &str) -> String {
    STRAY_NAME_CHARS.replace_all(raw, "").trim().to_string()
}

pub fn sanitize_participants(raw: &[String]) -> Vec<String> {
    raw.iter().map(|name| sanitize_participant_name(name)).collect()
}

pub fn validate_event_id(event_id: &str) -> Result<()> {
    Uuid::parse_str(event_id)
        .map(|_| ())
        .map_err(|_| invalid(format!("Invalid event id: {}", event_id)))
}

pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().chars().count() > MAX_TITLE_CHARS {
        return Err(invalid(format!(
            "Title must be {} characters or less",
            MAX_TITLE_CHARS
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<()> {
    if description.trim().chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(invalid(format!(
            "Description must be {} characters or less",
            MAX_DESCRIPTION_CHARS
        )));
    }
    Ok(())
}

pub fn validate_participant_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(invalid("Participant name is required"));
    }
    if name.chars().count() > MAX_PARTICIPANT_NAME_CHARS {
        return Err(invalid(format!(
            "Participant name must be {} characters or less",
            MAX_PARTICIPANT_NAME_CHARS
        )));
    }
    Ok(())
}

pub fn validate_participants(participants: &[String]) -> Result<()> {
    if participants.is_empty() || participants.len() > MAX_PARTICIPANTS {
        return Err(invalid(format!(
            "Between 1 and {} participants are required",
            MAX_PARTICIPANTS
        )));
    }
    let mut seen = HashSet::new();
    for name in participants {
        validate_participant_name(name)?;
        if !seen.insert(name.as_str()) {
            return Err(invalid(format!("Duplicate participant name: {}", name)));
        }
    }
    Ok(())
}

/// Dates must be unique and fall between `today` and three months later
pub fn validate_dates(dates: &[NaiveDate], today: NaiveDate) -> Result<()> {
    if dates.is_empty() {
        return Err(invalid("At least one date is required"));
    }
    let latest = today
        .checked_add_months(Months::new(DATE_WINDOW_MONTHS))
        .ok_or_else(|| invalid("Date window out of range"))?;

    let mut seen = HashSet::new();
    for date in dates {
        if *date < today || *date > latest {
            return Err(invalid(format!(
                "Date {} must be within {} months from today",
                date, DATE_WINDOW_MONTHS
            )));
        }
        if !seen.insert(date) {
            return Err(invalid(format!("Duplicate date: {}", date)));
        }
    }
    Ok(())
}

pub fn validate_new_event(input: &NewEvent, today: NaiveDate) -> Result<()> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(description) = &input.description {
        validate_description(description)?;
    }
    validate_dates(&input.dates, today)?;
    validate_participants(&input.participants)
}

pub fn validate_event_patch(patch: &EventPatch, today: NaiveDate) -> Result<()> {
    if patch.is_empty() {
        return Err(invalid("No fields to update"));
    }
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(Some(description)) = &patch.description {
        validate_description(description)?;
    }
    if let Some(dates) = &patch.dates {
        validate_dates(dates, today)?;
    }
    if let Some(participants) = &patch.participants {
        validate_participants(participants)?;
    }
    Ok(())
}

pub fn validate_response_update(update: &ResponseUpdate) -> Result<()> {
    validate_participant_name(&update.participant_name)
}
