//! Public shapes returned by the API.
//!
//! Nullable columns are always emitted (as `null` when empty). Optional
//! fields that were never set are left out of the payload.

use chrono::{NaiveDateTime, SecondsFormat};

pub mod access_override;
pub mod patient;

/// Formats a stored UTC timestamp as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true)
}
