// SPDX-License-Identifier: MIT

//!
//! Date periods
//!

use crate::is_whole_fraction;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Display;

/// One part of a period's identifier (e.g. `Aug` or `2016`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Identifier {
    Text(String),
    Number(i64),
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Identifier {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Identifier {
    fn from(value: i32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<u32> for Identifier {
    fn from(value: u32) -> Self {
        Self::Number(i64::from(value))
    }
}

/// A fiscal week: its number within the fiscal year, and that year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WeekNumber {
    pub number: i64,
    pub year: i32,
}

/// A contiguous bucket of dates (`start_date` inclusive, `end_date`
/// exclusive).  A period may be a fragment of a larger period that has been
/// split at a selection boundary, in which case its `fraction` is below 1 and
/// its `index` is fractional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatePeriod {
    pub identifiers: Vec<Identifier>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// The fiscal year of the start date
    pub year: i32,

    /// The fiscal week of the start date
    pub week: WeekNumber,

    /// The proportion of the original period this represents, in (0, 1]
    pub fraction: f64,

    /// Ordering key
    pub index: f64,
}

impl DatePeriod {
    /// The selection index of the period's trailing edge
    pub fn end_index(&self) -> f64 {
        self.index + self.fraction
    }

    /// Whether the period is a fragment of a split period
    pub fn is_split(&self) -> bool {
        !is_whole_fraction(self.fraction)
    }

    /// Whether the date falls in `[start_date, end_date)`
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date < self.end_date
    }

    /// The number of days spanned
    pub fn day_count(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// The identifiers as they're displayed (e.g. `Aug 2016`)
    pub fn identifier_text(&self) -> String {
        self.identifiers
            .iter()
            .map(|identifier| identifier.to_string())
            .collect::<Vec<String>>()
            .join(" ")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn august() -> DatePeriod {
        DatePeriod {
            identifiers: vec!["Aug".into(), 2016.into()],
            start_date: NaiveDate::from_ymd_opt(2016, 8, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2016, 9, 1).unwrap(),
            year: 2016,
            week: WeekNumber {
                number: 31,
                year: 2016,
            },
            fraction: 1.0,
            index: 7.0,
        }
    }

    #[test]
    fn contains() {
        let period = august();
        assert!(period.contains(NaiveDate::from_ymd_opt(2016, 8, 1).unwrap()));
        assert!(period.contains(NaiveDate::from_ymd_opt(2016, 8, 31).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2016, 9, 1).unwrap()));
        assert_eq!(period.day_count(), 31);
    }

    #[test]
    fn indices() {
        let mut period = august();
        assert_eq!(period.end_index(), 8.0);
        assert!(!period.is_split());
        period.fraction = 0.25;
        assert_eq!(period.end_index(), 7.25);
        assert!(period.is_split());
    }

    #[test]
    fn identifier_text() {
        assert_eq!(august().identifier_text(), "Aug 2016");
    }

    #[test]
    fn serialised_for_the_host() {
        let json = serde_json::to_value(august()).unwrap();
        assert_eq!(json["identifiers"], serde_json::json!(["Aug", 2016]));
        assert_eq!(json["start_date"], "2016-08-01");
        assert_eq!(json["index"], 7.0);
    }
}
