//! Expiration-status classification ("caducidad").

use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::Serialize;

/// Products expiring within this many days (inclusive) are flagged as near.
pub const NEAR_EXPIRY_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryStatus {
    Expired,
    Near,
    Valid,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidDateError {
    #[error("invalid date `{0}`: expected YYYY-MM-DD")]
    Malformed(String),
    #[error("{from} + {days} days is outside the supported calendar")]
    OutOfRange { from: NaiveDate, days: i64 },
}

/// Badge shown next to a product in the tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub color: &'static str,
    pub label: &'static str,
}

impl ExpiryStatus {
    pub fn badge(self) -> Badge {
        match self {
            ExpiryStatus::Expired => Badge { color: "red", label: "Caducado" },
            ExpiryStatus::Near => Badge { color: "orange", label: "Por caducar" },
            ExpiryStatus::Valid => Badge { color: "green", label: "Vigente" },
        }
    }
}

/// Whole days from `reference` until `expiration`. Both are calendar dates, so
/// the difference is already an integer and needs no rounding.
pub fn days_remaining(expiration: NaiveDate, reference: NaiveDate) -> i64 {
    (expiration - reference).num_days()
}

pub fn classify(expiration: NaiveDate, reference: NaiveDate) -> ExpiryStatus {
    let days = days_remaining(expiration, reference);
    if days <= 0 {
        ExpiryStatus::Expired
    } else if days <= NEAR_EXPIRY_DAYS {
        ExpiryStatus::Near
    } else {
        ExpiryStatus::Valid
    }
}

/// Parse an ISO calendar date (`YYYY-MM-DD`). A full RFC 3339 timestamp, as
/// written by some clients (`2026-01-31T00:00:00.000Z`), is accepted and
/// reduced to its date in the timestamp's own offset.
pub fn parse_date(input: &str) -> Result<NaiveDate, InvalidDateError> {
    let trimmed = input.trim();
    let parsed = if trimmed.contains('T') {
        DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive())
    } else {
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
    };
    parsed.map_err(|_| InvalidDateError::Malformed(input.to_string()))
}

/// `from + days`, or an error when the result leaves chrono's calendar.
pub fn add_days(from: NaiveDate, days: i64) -> Result<NaiveDate, InvalidDateError> {
    Duration::try_days(days)
        .and_then(|delta| from.checked_add_signed(delta))
        .ok_or(InvalidDateError::OutOfRange { from, days })
}

/// The shop's current calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
