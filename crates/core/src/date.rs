// SPDX-License-Identifier: MIT

//!
//! Raw date values, the observed date extent & date arithmetic helpers
//!

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};
use log::debug;
use serde::Deserialize;
use thiserror::Error;

/// Whole numbers within this range are treated as years rather than epoch
/// milliseconds
const YEAR_LIKE_NUMBERS: std::ops::RangeInclusive<f64> = 1000.0..=9999.0;

/// Short month names, indexed by 0-based month
const SHORT_MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Errors that can arise when coercing a raw value into a date
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DateError {
    /// The number is neither a year nor a valid epoch millisecond timestamp
    #[error("Number `{0}` is not a date")]
    InvalidNumber(f64),

    /// The string couldn't be parsed using any of the accepted formats
    #[error("String `{0}` is not a date")]
    InvalidString(String),

    /// Null or some other non-date value
    #[error("Value is not a date")]
    NotADate,
}

/// A raw value supplied by the host for the date column.
///
/// Numbers, strings and native dates are accepted.  Anything else (including
/// `null`) deserialises successfully but never becomes a date.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawDateValue {
    Number(f64),
    Text(String),
    #[serde(skip_deserializing)]
    Date(NaiveDate),
    Null,
    Other(serde_json::Value),
}

impl RawDateValue {
    /// Coerce the raw value into a date
    pub fn to_date(&self) -> Result<NaiveDate, DateError> {
        match self {
            Self::Number(number) => date_from_number(*number),
            Self::Text(text) => date_from_str(text),
            Self::Date(date) => Ok(*date),
            Self::Null | Self::Other(_) => Err(DateError::NotADate),
        }
    }
}

impl From<NaiveDate> for RawDateValue {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

fn date_from_number(number: f64) -> Result<NaiveDate, DateError> {
    if !number.is_finite() {
        return Err(DateError::InvalidNumber(number));
    }

    // Years
    if number.fract() == 0.0 && YEAR_LIKE_NUMBERS.contains(&number) {
        return NaiveDate::from_ymd_opt(number as i32, 1, 1)
            .ok_or(DateError::InvalidNumber(number));
    }

    // Epoch milliseconds
    DateTime::from_timestamp_millis(number as i64)
        .map(|date_time| date_time.date_naive())
        .ok_or(DateError::InvalidNumber(number))
}

fn date_from_str(text: &str) -> Result<NaiveDate, DateError> {
    let text = text.trim();

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date);
        }
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(text) {
        return Ok(date_time.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(date_time.date());
        }
    }

    // A bare year
    match text.parse::<i32>() {
        Ok(year) if YEAR_LIKE_NUMBERS.contains(&f64::from(year)) => {
            NaiveDate::from_ymd_opt(year, 1, 1).ok_or(DateError::InvalidString(text.to_string()))
        }
        _ => Err(DateError::InvalidString(text.to_string())),
    }
}

/// The observed date extent.  Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateExtent {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateExtent {
    /// Create a new extent, swapping the dates if they're the wrong way round
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Find the extent of the raw values.  Values that aren't dates are
    /// silently dropped.  Returns `None` if no value is a date.
    pub fn from_values<'a, I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a RawDateValue>,
    {
        let mut extent: Option<Self> = None;
        let mut dropped = 0;
        for value in values {
            let date = match value.to_date() {
                Ok(date) => date,
                Err(_) => {
                    dropped += 1;
                    continue;
                }
            };
            extent = Some(match extent {
                Some(extent) => Self {
                    start: extent.start.min(date),
                    end: extent.end.max(date),
                },
                None => Self {
                    start: date,
                    end: date,
                },
            });
        }
        if dropped > 0 {
            debug!("dropped {dropped} raw values that are not dates");
        }
        extent
    }

    /// Whether the date falls within the extent (inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }
}

/// Build a date from a year, a 0-based month and a 1-based day.
///
/// Overflowing months and days roll over into the following months/years
/// (e.g. month 12 is January of the next year, and 31 June is 1 July).
pub fn date_from_parts(year: i32, month_index: u32, day: u32) -> NaiveDate {
    let year = year.saturating_add((month_index / 12) as i32);
    let first_of_month = NaiveDate::from_ymd_opt(year, month_index % 12 + 1, 1).unwrap_or(
        if year < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        },
    );
    first_of_month
        .checked_add_days(Days::new(u64::from(day.saturating_sub(1))))
        .unwrap_or(NaiveDate::MAX)
}

/// The day after
pub fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(NaiveDate::MAX)
}

/// The day before
pub fn prev_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(NaiveDate::MIN)
}

/// e.g. `Jan`
pub fn short_month_name(date: NaiveDate) -> &'static str {
    SHORT_MONTH_NAMES[date.month0() as usize]
}

/// The number of days in the date's month
pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = date_from_parts(date.year(), date.month0(), 1);
    let first_of_next = date_from_parts(date.year(), date.month0() + 1, 1);
    (first_of_next - first).num_days() as u32
}

/// Every date from `start` to `end` inclusive.  Empty if `start > end`.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|date| *date <= end).collect()
}
