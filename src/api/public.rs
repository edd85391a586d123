//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

use crate::schedule::ScheduleError;

// Errors

pub struct ApiError(anyhow::Error);

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self.0.downcast_ref::<ScheduleError>() {
            Some(err) => {
                let status = match err {
                    ScheduleError::Validation(_) => StatusCode::BAD_REQUEST,
                    ScheduleError::NotFound(_) => StatusCode::NOT_FOUND,
                    ScheduleError::TransactionFailure(_) => StatusCode::CONFLICT,
                    ScheduleError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, err.kind())
            }
            None => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

/// Convert `ApiError` into an Axum compatible response. Scheduling
/// errors keep their kind so clients can tell a missing event apart
/// from a failed write.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();

        if status.is_server_error() {
            tracing::error!("{}", self.0);
        } else {
            tracing::warn!("{}", self.0);
        }

        let body = json!({
            "error": self.0.to_string(),
            "kind": kind,
        });
        (status, Json(body)).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` or `Result<_, ScheduleError>` to turn them into
/// `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod events {
    pub use crate::api::routes::events::public::*;
}

pub mod responses {
    pub use crate::api::routes::responses::public::*;
}
