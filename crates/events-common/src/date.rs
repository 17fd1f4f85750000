//! Event date normalization
//!
//! Events accept either a plain calendar date (`2025-01-01`) or a full
//! RFC 3339 timestamp. Both are stored as a UTC instant; a plain date
//! becomes midnight UTC.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("Event date is required")]
    Empty,
    #[error("Invalid event date: {0}")]
    Malformed(String),
}

pub fn parse_event_date(raw: &str) -> Result<DateTime<Utc>, DateError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DateError::Empty);
    }

    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(day.and_time(NaiveTime::MIN).and_utc());
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DateError::Malformed(raw.to_string()))
}

/// `YYYY-MM-DD` form used to pre-fill date inputs
pub fn date_only(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}
