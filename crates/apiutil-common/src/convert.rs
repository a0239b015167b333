//! String-encoded values found in service responses.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Layout the service uses for timestamps (always UTC)
pub const API_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp as sent by the service, e.g. `"2017-07-10 17:05:00"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiTime(pub String);

impl ApiTime {
    /// `Ok(None)` for an empty value.
    pub fn to_datetime(&self) -> Result<Option<DateTime<Utc>>, chrono::ParseError> {
        if self.0.is_empty() {
            return Ok(None);
        }
        let naive = NaiveDateTime::parse_from_str(&self.0, API_TIME_FORMAT)?;
        Ok(Some(naive.and_utc()))
    }
}

impl From<&str> for ApiTime {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Boolean sent as a string. Anything but a case-insensitive `"false"` is true.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiBool(pub String);

impl ApiBool {
    pub fn as_bool(&self) -> bool {
        !self.0.eq_ignore_ascii_case("false")
    }
}

impl From<&str> for ApiBool {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
