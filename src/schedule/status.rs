//! Availability status for a single (participant, date) cell
use std::fmt;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const NO_RESPONSE: &str = "未回答";
const AVAILABLE: &str = "◯";
const UNAVAILABLE: &str = "×";
const MAYBE: &str = "△";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    #[default]
    NoResponse,
    Available,
    Unavailable,
    Maybe,
}

impl ResponseStatus {
    pub const ALL: [ResponseStatus; 4] = [
        ResponseStatus::NoResponse,
        ResponseStatus::Available,
        ResponseStatus::Unavailable,
        ResponseStatus::Maybe,
    ];

    /// Map any input onto one of the four statuses. Anything that is
    /// not exactly one of the wire tokens becomes `NoResponse`.
    pub fn normalize(raw: &str) -> Self {
        match raw {
            AVAILABLE => Self::Available,
            UNAVAILABLE => Self::Unavailable,
            MAYBE => Self::Maybe,
            _ => Self::NoResponse,
        }
    }

    /// The token used on the wire and in storage
    pub fn token(&self) -> &'static str {
        match self {
            Self::NoResponse => NO_RESPONSE,
            Self::Available => AVAILABLE,
            Self::Unavailable => UNAVAILABLE,
            Self::Maybe => MAYBE,
        }
    }

    pub fn is_answered(&self) -> bool {
        !matches!(self, Self::NoResponse)
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl Serialize for ResponseStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

// Deserializing never fails on an unknown token, it falls back to
// `NoResponse` the same way `normalize` does.
impl<'de> Deserialize<'de> for ResponseStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::normalize(&raw))
    }
}

impl ToSql for ResponseStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.token()))
    }
}

impl FromSql for ResponseStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(Self::normalize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_normalizes_known_tokens() {
        assert_eq!(ResponseStatus::normalize("◯"), ResponseStatus::Available);
        assert_eq!(ResponseStatus::normalize("×"), ResponseStatus::Unavailable);
        assert_eq!(ResponseStatus::normalize("△"), ResponseStatus::Maybe);
        assert_eq!(ResponseStatus::normalize("未回答"), ResponseStatus::NoResponse);
    }

    #[test]
    fn it_normalizes_unknown_input_to_no_response() {
        assert_eq!(ResponseStatus::normalize("bogus"), ResponseStatus::NoResponse);
        assert_eq!(ResponseStatus::normalize(""), ResponseStatus::NoResponse);
        // Near misses are not accepted
        assert_eq!(ResponseStatus::normalize(" ◯"), ResponseStatus::NoResponse);
        assert_eq!(ResponseStatus::normalize("○"), ResponseStatus::NoResponse);
    }

    #[test]
    fn it_is_idempotent() {
        for raw in ["◯", "×", "△", "未回答", "bogus", "available"] {
            let once = ResponseStatus::normalize(raw);
            let twice = ResponseStatus::normalize(once.token());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn it_serializes_as_wire_token() {
        let json = serde_json::to_string(&ResponseStatus::Maybe).unwrap();
        assert_eq!(json, "\"△\"");

        let status: ResponseStatus = serde_json::from_str("\"×\"").unwrap();
        assert_eq!(status, ResponseStatus::Unavailable);

        let status: ResponseStatus = serde_json::from_str("\"yes please\"").unwrap();
        assert_eq!(status, ResponseStatus::NoResponse);
    }

    #[test]
    fn it_reports_answered() {
        assert!(!ResponseStatus::NoResponse.is_answered());
        assert!(ResponseStatus::Available.is_answered());
        assert!(ResponseStatus::Unavailable.is_answered());
        assert!(ResponseStatus::Maybe.is_answered());
    }
}
