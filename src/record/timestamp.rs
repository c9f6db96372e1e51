//! Serde adapter for persisted `createdAt` / `updatedAt` values.
//!
//! Stored blobs may carry either a full instant or a bare `YYYY-MM-DD` date.
//! Both decode; a date becomes midnight UTC. Values are always written back
//! as RFC 3339.
//!
//! ```ignore
//! #[serde(with = "closet_store::record::timestamp")]
//! pub created_at: Timestamp,
//! ```

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::Timestamp;

/// Parse an RFC 3339 instant or a `YYYY-MM-DD` date.
pub fn parse(value: &str) -> Option<Timestamp> {
    let value = value.trim();
    if let Ok(instant) = value.parse::<DateTime<Utc>>() {
        return Some(instant);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

pub fn serialize<S: Serializer>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
    value.serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
}
