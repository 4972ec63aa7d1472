//! Shared form-input parsing helpers.
//!
//! Entry forms deliver money and count fields as display-formatted text
//! (`"$450,000"`, `"12"`). These helpers strip the formatting and parse to
//! typed values, distinguishing "field left blank" from "field present but
//! invalid" so validators can report the right violation.

use chrono::{Datelike, NaiveDate};

/// Marker for a present-but-unparseable (or negative) numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InvalidAmount;

/// Parse a currency-formatted field to a non-negative amount.
///
/// Blank input means the field was left empty and yields `Ok(None)`.
/// Formatting characters (`$`, `,`, spaces) are stripped; a sign or any
/// remaining garbage makes the field invalid rather than silently zero.
pub(crate) fn parse_money(raw: &str) -> Result<Option<f64>, InvalidAmount> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let value: f64 = cleaned.parse().map_err(|_| InvalidAmount)?;
    if !value.is_finite() || value < 0.0 {
        return Err(InvalidAmount);
    }
    Ok(Some(value))
}

/// Parse a whole-number count field to a non-negative integer.
pub(crate) fn parse_count(raw: &str) -> Result<Option<u32>, InvalidAmount> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    let value: i64 = cleaned.parse().map_err(|_| InvalidAmount)?;
    u32::try_from(value).map(Some).map_err(|_| InvalidAmount)
}

/// Sanity window accepted for contract and closing dates: the start of the
/// year five years back through the end of the year two years ahead.
pub(crate) fn reasonable_date_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let earliest = NaiveDate::from_ymd_opt(today.year() - 5, 1, 1).unwrap_or(NaiveDate::MIN);
    let latest = NaiveDate::from_ymd_opt(today.year() + 2, 12, 31).unwrap_or(NaiveDate::MAX);
    (earliest, latest)
}
