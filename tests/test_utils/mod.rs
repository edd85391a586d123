//! Test utilities for integration tests
#![allow(dead_code)]
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Days, NaiveDate, Utc};
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt;

use datepoll::api::AppState;
use datepoll::api::app;
use datepoll::core::AppConfig;
use datepoll::core::db::{async_db, initialize_db};
use datepoll::schedule::SqliteStore;

/// A router backed by a database in a temporary directory. The
/// directory is removed when this is dropped.
pub struct TestApp {
    pub router: Router,
    pub store: SqliteStore,
    _dir: TempDir,
}

impl TestApp {
    /// Send a request with an optional JSON body and return the status
    /// and the parsed JSON response
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = body_to_string(response.into_body()).await;
        let json = serde_json::from_str(&body).unwrap_or(Value::Null);
        (status, json)
    }

    /// Create an event through the API and return its id
    pub async fn create_event(&self, body: Value) -> String {
        let (status, json) = self.request("POST", "/api/events", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{}", json);
        json["id"].as_str().unwrap().to_string()
    }
}

/// Creates a test application router with a fresh database
pub async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let storage_path = dir.path().display().to_string();
    let app_config = AppConfig::with_storage_path(&storage_path);
    std::fs::create_dir_all(&app_config.db_path).expect("Failed to create db directory");

    let db = async_db(&app_config.db_path)
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await
    .unwrap();

    let store = SqliteStore::new(db);
    let app_state = AppState::new(store.clone(), app_config);
    TestApp {
        router: app(Arc::new(app_state)),
        store,
        _dir: dir,
    }
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// A date `days` from today, always inside the allowed window
pub fn days_from_today(days: u64) -> NaiveDate {
    Utc::now().date_naive() + Days::new(days)
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
