use std::env;
use std::time::Duration;

pub const DEFAULT_EVENT_TTL_DAYS: i64 = 90;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    /// How long an event lives before the purge job removes it
    pub event_ttl_days: i64,
    pub poll_interval: Duration,
    /// Base URL of a running server, used by `watch`
    pub api_url: String,
}

impl AppConfig {
    pub fn with_storage_path(storage_path: &str) -> Self {
        Self {
            storage_path: storage_path.to_string(),
            db_path: format!("{}/db", storage_path),
            event_ttl_days: DEFAULT_EVENT_TTL_DAYS,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            api_url: "http://127.0.0.1:2222".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let host = "127.0.0.1";
        let port = "2222";
        let storage_path = env::var("DATEPOLL_STORAGE_PATH").unwrap_or("./".to_string());
        let event_ttl_days = env::var("DATEPOLL_EVENT_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_EVENT_TTL_DAYS);
        let poll_interval = parse_poll_interval(env::var("DATEPOLL_POLL_INTERVAL_SECS").ok());
        let api_url =
            env::var("DATEPOLL_API_URL").unwrap_or(format!("http://{}:{}", host, port));

        Self {
            event_ttl_days,
            poll_interval,
            api_url,
            ..Self::with_storage_path(&storage_path)
        }
    }
}

// Unparseable or zero values fall back to the default
fn parse_poll_interval(value: Option<String>) -> Duration {
    let secs = value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
    Duration::from_secs(secs)
}
