//! Specifies how transaction timestamps are written to and read from JSON.
//!
//! Timestamps are serialized as ISO-8601 without an offset, e.g.
//! "2024-02-01T00:00:00". The default serializer for [time::PrimitiveDateTime]
//! prints midnight as "0:00:00.0", which does not round-trip, hence the
//! explicit format.
//!
//! Deserialization also accepts a bare date ("2024-02-01", read as midnight)
//! and RFC 3339 strings with an offset, in which case the wall-clock part is
//! kept and the offset dropped.

use serde::{Deserialize, Deserializer, Serializer};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

/// Timestamp format, e.g. "2024-02-01T13:45:00".
const TIMESTAMP_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse a timestamp from any of the accepted input forms.
///
/// # Errors
/// Returns the parse error of the full timestamp format if no form matches.
pub fn parse_timestamp(text: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    let text = text.trim();

    match PrimitiveDateTime::parse(text, TIMESTAMP_FORMAT) {
        Ok(timestamp) => Ok(timestamp),
        Err(error) => {
            if let Ok(date) = Date::parse(text, DATE_FORMAT) {
                return Ok(date.midnight());
            }

            if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
                return Ok(PrimitiveDateTime::new(date_time.date(), date_time.time()));
            }

            Err(error)
        }
    }
}

/// Format a timestamp as "YYYY-MM-DDTHH:MM:SS".
///
/// # Errors
/// Returns an error if the timestamp cannot be formatted, e.g. a year that
/// needs more than four digits.
pub fn format_timestamp(timestamp: &PrimitiveDateTime) -> Result<String, time::error::Format> {
    timestamp.format(TIMESTAMP_FORMAT)
}

pub fn serialize<S>(timestamp: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = format_timestamp(timestamp).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<PrimitiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text).map_err(serde::de::Error::custom)
}
