//! Wire models for the storefront REST API.
//!
//! These are non-authoritative read copies of server-owned entities plus the
//! request payloads the client sends. Every response model tolerates unknown
//! fields and fills missing optional fields with defaults, since the server
//! returns raw documents whose shape drifts between endpoints.
//!
//! Money crosses the wire as JSON numbers and is held as [`rust_decimal::Decimal`].

pub mod admin;
pub mod catalog;
pub mod loyalty;
pub mod order;
pub mod support;
pub mod user;
pub mod wallet;

pub use admin::*;
pub use catalog::*;
pub use loyalty::*;
pub use order::*;
pub use support::*;
pub use user::*;
pub use wallet::*;

use serde::{Deserialize, Serialize};

/// Generic `{"message": ...}` acknowledgement returned by mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

/// Lenient timestamp decoding.
///
/// The server stores some timestamps as offset-aware ISO strings and others as
/// naive UTC datetimes, which serialize without an offset. Both are accepted;
/// anything unparseable decodes as `None` instead of failing the whole
/// document.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Parse an RFC 3339 or naive ISO 8601 timestamp, assuming UTC.
    #[must_use]
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Deserialize an optional lenient timestamp.
    ///
    /// # Errors
    ///
    /// Only fails if the value is neither a string nor null.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    /// Serialize as RFC 3339, or null.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::ref_option)] // signature required by `serialize_with`
    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::timestamp;

    #[test]
    fn test_timestamp_accepts_offset_and_naive_forms() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(timestamp::parse("2025-03-01T12:30:00+00:00"), Some(expected));
        assert_eq!(timestamp::parse("2025-03-01T12:30:00Z"), Some(expected));
        assert_eq!(timestamp::parse("2025-03-01T12:30:00"), Some(expected));
        assert_eq!(timestamp::parse("2025-03-01T12:30:00.000000"), Some(expected));
        assert_eq!(timestamp::parse("yesterday"), None);
    }
}
