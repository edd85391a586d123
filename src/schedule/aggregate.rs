//! Per-date tallies and the best date recommendation
use std::cmp::Reverse;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::models::{Event, Response, ResponseMap};
use super::status::ResponseStatus;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DateSummary {
    pub date: NaiveDate,
    pub available: usize,
    pub unavailable: usize,
    pub maybe: usize,
    pub no_response: usize,
    /// Share of participants that answered, rounded to one decimal
    pub response_rate_percent: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateStat {
    pub date: NaiveDate,
    pub available_count: usize,
    pub no_response_count: usize,
    pub available_ratio_percent: u32,
    /// Nobody has answered for this date yet
    pub awaiting_responses: bool,
    pub recommended: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub best_dates: Vec<NaiveDate>,
    /// Every date, most available first
    pub ranked: Vec<DateStat>,
}

impl Recommendation {
    /// The dates that were not recommended, in ranked order
    pub fn alternatives(&self) -> impl Iterator<Item = &DateStat> {
        self.ranked.iter().filter(|stat| !stat.recommended)
    }
}

/// Everything a view needs to render an event's grid
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub event_id: String,
    pub participants: Vec<String>,
    pub responses: ResponseMap,
    pub dates: Vec<DateSummary>,
    pub recommendation: Recommendation,
}

/// Group rows by participant then date. A later row for the same cell
/// replaces an earlier one and rows without a participant are skipped.
pub fn build_response_map(rows: &[Response]) -> ResponseMap {
    let mut map = ResponseMap::new();
    for row in rows {
        if row.participant_name.trim().is_empty() {
            continue;
        }
        map.entry(row.participant_name.clone())
            .or_default()
            .insert(row.date, row.status);
    }
    map
}

fn lookup(map: &ResponseMap, participant: &str, date: &NaiveDate) -> ResponseStatus {
    map.get(participant)
        .and_then(|dates| dates.get(date))
        .copied()
        .unwrap_or_default()
}

pub fn summarize_date(date: NaiveDate, map: &ResponseMap, participants: &[String]) -> DateSummary {
    let mut summary = DateSummary {
        date,
        available: 0,
        unavailable: 0,
        maybe: 0,
        no_response: 0,
        response_rate_percent: 0.0,
    };

    for participant in participants {
        match lookup(map, participant, &date) {
            ResponseStatus::Available => summary.available += 1,
            ResponseStatus::Unavailable => summary.unavailable += 1,
            ResponseStatus::Maybe => summary.maybe += 1,
            ResponseStatus::NoResponse => summary.no_response += 1,
        }
    }

    let total = participants.len();
    if total > 0 {
        let responded = (total - summary.no_response) as f64;
        summary.response_rate_percent = (responded / total as f64 * 1000.0).round() / 10.0;
    }
    summary
}

pub fn recommend(
    dates: &[NaiveDate],
    map: &ResponseMap,
    participants: &[String],
) -> Recommendation {
    let total = participants.len();

    let mut ranked: Vec<DateStat> = dates
        .iter()
        .map(|date| {
            let summary = summarize_date(*date, map, participants);
            let available_ratio_percent = if total > 0 {
                (summary.available as f64 / total as f64 * 100.0).round() as u32
            } else {
                0
            };
            DateStat {
                date: *date,
                available_count: summary.available,
                no_response_count: summary.no_response,
                available_ratio_percent,
                awaiting_responses: summary.no_response == total,
                recommended: false,
            }
        })
        .collect();

    ranked.sort_by_key(|stat| (Reverse(stat.available_count), stat.date));

    // Never recommend a date that nobody can attend
    let max_available = ranked.first().map_or(0, |stat| stat.available_count);
    let mut best_dates = Vec::new();
    if max_available > 0 {
        for stat in ranked.iter_mut() {
            if stat.available_count == max_available {
                stat.recommended = true;
                best_dates.push(stat.date);
            }
        }
    }

    Recommendation { best_dates, ranked }
}

pub fn summarize_event(event: &Event, rows: &[Response]) -> EventSummary {
    summarize_response_map(event, build_response_map(rows))
}

/// Same as `summarize_event` for responses that were already grouped
pub fn summarize_response_map(event: &Event, responses: ResponseMap) -> EventSummary {
    let dates = event
        .dates
        .iter()
        .map(|date| summarize_date(*date, &responses, &event.participants))
        .collect();
    let recommendation = recommend(&event.dates, &responses, &event.participants);

    EventSummary {
        event_id: event.id.clone(),
        participants: event.participants.clone(),
        responses,
        dates,
        recommendation,
    }
}
