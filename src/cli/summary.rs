use std::fmt::Write;

use anyhow::{Context, Result};

use crate::core::db::async_db;
use crate::schedule::{
    Event, EventSummary, ResponseStatus, ScheduleStore, SqliteStore, service,
    summarize_response_map,
};

/// Render a summary as a plain text table followed by the recommendation
pub fn render_summary(title: &str, summary: &EventSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", title, summary.event_id);
    let _ = writeln!(out, "Participants: {}", summary.participants.join(", "));
    let _ = writeln!(
        out,
        "{:<12}{:>4}{:>4}{:>4}{:>6}{:>8}",
        "Date",
        ResponseStatus::Available.token(),
        ResponseStatus::Unavailable.token(),
        ResponseStatus::Maybe.token(),
        ResponseStatus::NoResponse.token(),
        "Rate"
    );
    for date in &summary.dates {
        let _ = writeln!(
            out,
            "{:<12}{:>4}{:>4}{:>4}{:>6}{:>7.1}%",
            date.date.to_string(),
            date.available,
            date.unavailable,
            date.maybe,
            date.no_response,
            date.response_rate_percent
        );
    }

    let recommendation = &summary.recommendation;
    if recommendation.best_dates.is_empty() {
        let _ = writeln!(out, "Best: none yet");
    } else {
        let best: Vec<String> = recommendation
            .best_dates
            .iter()
            .map(|d| d.to_string())
            .collect();
        let _ = writeln!(out, "Best: {}", best.join(", "));
    }
    for stat in recommendation.alternatives() {
        let note = if stat.awaiting_responses {
            " (awaiting responses)"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "  {} {}% available{}",
            stat.date, stat.available_ratio_percent, note
        );
    }
    out
}

/// Read the event and its responses once and summarize them
async fn load_summary<S: ScheduleStore>(
    store: &S,
    event_id: &str,
) -> crate::schedule::error::Result<(Event, EventSummary)> {
    let (event, responses) = service::get_event_with_responses(store, event_id).await?;
    let summary = summarize_response_map(&event, responses);
    Ok((event, summary))
}

pub async fn run(event_id: &str, json: bool, db_path: &str) -> Result<()> {
    let db = async_db(db_path)
        .await
        .context("Failed to connect to db")?;
    let store = SqliteStore::new(db);

    let (event, summary) = load_summary(&store, event_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_summary(&event.title, &summary));
    }

    Ok(())
}
