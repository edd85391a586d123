//! Error types for scheduling operations
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A write transaction failed and was rolled back
    #[error("Transaction failed: {0}")]
    TransactionFailure(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl ScheduleError {
    /// Short machine readable name used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::TransactionFailure(_) => "transaction",
            Self::StorageUnavailable(_) => "storage",
        }
    }

    pub fn event_not_found(event_id: &str) -> Self {
        Self::NotFound(format!("Event {} not found", event_id))
    }

    /// Reads have nothing to roll back so every failure is reported as
    /// unavailable storage
    pub fn from_read(err: tokio_rusqlite::Error) -> Self {
        Self::StorageUnavailable(err.to_string())
    }

    /// Classify an error from a write transaction. A lost connection is
    /// still reported as unavailable storage, everything else means the
    /// transaction was rolled back.
    pub fn from_write(err: tokio_rusqlite::Error) -> Self {
        if is_unavailable(&err) {
            Self::StorageUnavailable(err.to_string())
        } else {
            Self::TransactionFailure(err.to_string())
        }
    }
}

fn is_unavailable(err: &tokio_rusqlite::Error) -> bool {
    use rusqlite::ErrorCode;

    match err {
        tokio_rusqlite::Error::ConnectionClosed => true,
        tokio_rusqlite::Error::Close(_) => true,
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _)) => matches!(
            e.code,
            ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::SystemIoFailure
        ),
        _ => false,
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
