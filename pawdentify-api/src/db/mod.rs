//! Per-collection database operations
//!
//! Thin wrappers over sqlx queries: insert, newest-first paginated list,
//! typed partial update, and SQL aggregation. All writes are single
//! statements except the scan insert + counter increment pair, which runs in
//! one transaction (see [`scans::create_scan`]).

use chrono::{DateTime, Utc};
use pawdentify_common::{Error, Result};
use uuid::Uuid;

pub mod community;
pub mod feedback;
pub mod pets;
pub mod preferences;
pub mod scans;
pub mod searches;
pub mod users;
pub mod vaccinations;

/// Parse a TEXT guid column
pub(crate) fn parse_guid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Internal(format!("bad guid {s:?}: {e}")))
}

/// Parse an RFC3339 TEXT timestamp column
pub(crate) fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("bad timestamp {s:?}: {e}")))
}

/// Parse a JSON-array TEXT column
pub(crate) fn parse_json_list<T: serde::de::DeserializeOwned>(s: &str) -> Result<Vec<T>> {
    serde_json::from_str(s).map_err(|e| Error::Internal(format!("bad json column: {e}")))
}

/// Serialize a list for a JSON TEXT column
pub(crate) fn to_json_list<T: serde::Serialize>(list: &[T]) -> Result<String> {
    serde_json::to_string(list).map_err(|e| Error::Internal(format!("json encode: {e}")))
}
