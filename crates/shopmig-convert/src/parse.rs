//! Cell-level value parsing for the ERP export.
//!
//! Every helper treats an empty (after trimming) cell as absent and reports a
//! malformed cell as `Err(reason)` so the caller can record a warning.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Datetime layouts seen in the export, most specific first.
const DATETIME_FORMATS: &[&str] = &["%Y/%m/%d %H:%M:%S", "%Y/%m/%d %H:%M", "%Y-%m-%d %H:%M:%S"];

const DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%Y-%m-%d"];

/// Parses a price cell. Thousands separators are stripped (`"3,000"` → `3000`).
pub(crate) fn parse_decimal(raw: &str) -> Result<Option<Decimal>, String> {
    let cleaned: String = raw.trim().chars().filter(|&c| c != ',').collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(&cleaned)
        .map(|d| Some(d.normalize()))
        .map_err(|e| e.to_string())
}

/// Parses a whole-number quantity. Thousands separators are stripped.
pub(crate) fn parse_quantity(raw: &str) -> Result<Option<i64>, String> {
    let cleaned: String = raw.trim().chars().filter(|&c| c != ',').collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    cleaned
        .parse::<i64>()
        .map(Some)
        .map_err(|e| e.to_string())
}

/// ERP flags are `1`/`0` in practice; a few textual spellings are accepted.
pub(crate) fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "y" | "yes"
    )
}

/// Parses a datetime or bare date cell. A bare date means midnight.
pub(crate) fn parse_datetime(raw: &str) -> Result<Option<NaiveDateTime>, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Some(parsed));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date.and_hms_opt(0, 0, 0));
        }
    }

    Err(format!("unrecognised date format '{value}'"))
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
