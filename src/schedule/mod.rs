//! Scheduling polls: events, per-date responses and their aggregation

pub mod aggregate;
pub mod db;
pub mod error;
pub mod models;
pub mod reconcile;
pub mod service;
pub mod status;
pub mod store;
pub mod validate;

pub use aggregate::{
    DateStat, DateSummary, EventSummary, Recommendation, build_response_map, recommend,
    summarize_date, summarize_event, summarize_response_map,
};
pub use db::SqliteStore;
pub use error::ScheduleError;
pub use models::{Event, EventPatch, NewEvent, Response, ResponseMap, ResponseUpdate};
pub use reconcile::ReconcilePlan;
pub use status::ResponseStatus;
pub use store::ScheduleStore;
