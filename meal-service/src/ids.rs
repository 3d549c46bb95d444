use std::fmt;
use std::str::FromStr;

use common_http_errors::ApiError;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Identifier of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Validate a client-supplied identifier before it reaches the store.
    pub fn from_param(param: &'static str, raw: &str) -> Result<Self, ApiError> {
        raw.parse().map_err(|_| {
            warn!(param, value = %raw, "Invalid ID format");
            ApiError::bad_request("invalid_id", "Invalid ID format")
        })
    }
}

impl From<Uuid> for RecordId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_uuid_text() {
        let id = RecordId::generate();
        let parsed = RecordId::from_param("id", &id.to_string()).expect("valid id");
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_malformed_text() {
        for raw in ["", "123", "not-an-id", "65f1c0ffee0ddba11c0ffee0"] {
            let err = RecordId::from_param("id", raw).expect_err("malformed id");
            assert!(matches!(err, ApiError::BadRequest { code: "invalid_id", .. }));
        }
    }
}
