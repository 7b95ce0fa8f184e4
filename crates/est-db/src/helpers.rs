//! Row-to-entity parsing helpers.
//!
//! Every repo converts `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing: decimals stored as TEXT,
//! dates/datetimes stored as ISO strings, enums stored as their serde wire
//! strings.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::DatabaseError;

/// Parse a TEXT column as `Decimal`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string is not a valid decimal.
pub fn parse_decimal(s: &str) -> Result<Decimal, DatabaseError> {
    s.parse()
        .map_err(|e| DatabaseError::Query(format!("Failed to parse decimal '{s}': {e}")))
}

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s
/// default format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string matches neither format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a TEXT column as an ISO calendar date (`"2026-09-01"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` on any other format.
pub fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DatabaseError::Query(format!("Failed to parse date '{s}': {e}")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all est-core enums — the stored strings are exactly the serde
/// renames ("Fixed Price", "weeks", "GBP").
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string matches no variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}
