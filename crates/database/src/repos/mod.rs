//! Database repository implementations

pub mod user_repository;

pub use user_repository::{UserPatch, UserRepository};

use chrono::{DateTime, Utc};
use tracing::warn;

/// Parse an optional RFC3339 column. Malformed values are logged and read as
/// absent so a single bad field never makes a record unreadable.
pub(crate) fn parse_optional_timestamp(column: &str, raw: Option<String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(value) => Some(value.with_timezone(&Utc)),
        Err(err) => {
            warn!(column, value = %raw, error = %err, "ignoring malformed timestamp");
            None
        }
    }
}

pub(crate) fn parse_timestamp(column: &str, raw: String) -> DateTime<Utc> {
    parse_optional_timestamp(column, Some(raw)).unwrap_or_default()
}

/// Fixed-width UTC form so stored timestamps compare correctly as text.
pub(crate) fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
