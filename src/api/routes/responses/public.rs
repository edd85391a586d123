//! Public types for the responses API
use serde::{Deserialize, Serialize};

use crate::schedule::ResponseUpdate;

pub use crate::schedule::ResponseUpdate as UpdateResponseRequest;

/// A batch of cell updates applied in one transaction. Clients send
/// either a bare array or an object with an `updates` array.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchUpdateRequest {
    List(Vec<ResponseUpdate>),
    Wrapped { updates: Vec<ResponseUpdate> },
}

impl BatchUpdateRequest {
    pub fn into_updates(self) -> Vec<ResponseUpdate> {
        match self {
            Self::List(updates) | Self::Wrapped { updates } => updates,
        }
    }
}
