// SPDX-License-Identifier: MIT

//!
//! The fiscal calendar
//!

use crate::{CalendarSettings, WeekDaySettings, date_from_parts, next_day};
use chrono::{Datelike, NaiveDate};
use std::cell::RefCell;
use std::collections::HashMap;

/// The fiscal calendar: the day on which the year starts, and the day on
/// which the week starts.
///
/// A calendar is immutable once created.  The only thing that changes is the
/// cache of each year's first week date, which is a memoisation of
/// [`Calendar::date_of_first_week`].
#[derive(Debug, Clone)]
pub struct Calendar {
    /// 0 (Sunday) to 6 (Saturday)
    first_day_of_week: u32,

    /// 0 (January) to 11 (December)
    first_month_of_year: u32,

    /// 1 to 31
    first_day_of_year: u32,

    /// The 0-based month in which each quarter starts
    quarter_start_months: [u32; 4],

    date_of_first_week: RefCell<HashMap<i32, NaiveDate>>,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::from_settings(&CalendarSettings::default(), &WeekDaySettings::default())
    }
}

impl Calendar {
    /// Create a new calendar.  Out of range values are clamped.
    pub fn new(first_month_of_year: u32, first_day_of_year: u32, first_day_of_week: u32) -> Self {
        let first_month_of_year = first_month_of_year.min(11);
        let quarter_start_months = [0, 3, 6, 9].map(|offset| (first_month_of_year + offset) % 12);
        Self {
            first_day_of_week: first_day_of_week.min(6),
            first_month_of_year,
            first_day_of_year: first_day_of_year.clamp(1, 31),
            quarter_start_months,
            date_of_first_week: RefCell::new(HashMap::new()),
        }
    }

    /// Create a new calendar from the host's settings (1-based month)
    pub fn from_settings(calendar: &CalendarSettings, week_day: &WeekDaySettings) -> Self {
        let calendar = calendar.sanitised();
        let week_day = week_day.sanitised();
        Self::new(
            u32::from(calendar.month) - 1,
            u32::from(calendar.day),
            u32::from(week_day.day),
        )
    }

    pub fn first_day_of_week(&self) -> u32 {
        self.first_day_of_week
    }

    pub fn first_month_of_year(&self) -> u32 {
        self.first_month_of_year
    }

    pub fn first_day_of_year(&self) -> u32 {
        self.first_day_of_year
    }

    pub fn quarter_start_months(&self) -> [u32; 4] {
        self.quarter_start_months
    }

    /// The day on which the fiscal year starts
    pub fn year_start_date(&self, year: i32) -> NaiveDate {
        date_from_parts(year, self.first_month_of_year, self.first_day_of_year)
    }

    /// The first date on or after the start of the fiscal year that falls on
    /// the first day of the week
    pub fn date_of_first_week(&self, year: i32) -> NaiveDate {
        if let Some(date) = self.date_of_first_week.borrow().get(&year) {
            return *date;
        }
        let date = self.calculate_date_of_first_week(year);
        self.date_of_first_week.borrow_mut().insert(year, date);
        date
    }

    /// The date on which the quarter (0 to 3) of the fiscal year starts.
    /// Quarters that start in a month before the fiscal year's first month
    /// fall in the following calendar year.
    pub fn quarter_start_date(&self, year: i32, quarter_index: usize) -> NaiveDate {
        let month = self.quarter_start_months[quarter_index.min(3)];
        let year = if month < self.first_month_of_year {
            year + 1
        } else {
            year
        };
        date_from_parts(year, month, self.first_day_of_year)
    }

    /// Whether the settings describe a different calendar to this one
    pub fn is_changed(&self, calendar: &CalendarSettings, week_day: &WeekDaySettings) -> bool {
        let other = Self::from_settings(calendar, week_day);
        self.first_month_of_year != other.first_month_of_year
            || self.first_day_of_year != other.first_day_of_year
            || self.first_day_of_week != other.first_day_of_week
    }

    fn calculate_date_of_first_week(&self, year: i32) -> NaiveDate {
        let mut date = self.year_start_date(year);
        while date.weekday().num_days_from_sunday() != self.first_day_of_week {
            date = next_day(date);
        }
        date
    }
}

impl PartialEq for Calendar {
    fn eq(&self, other: &Self) -> bool {
        self.first_month_of_year == other.first_month_of_year
            && self.first_day_of_year == other.first_day_of_year
            && self.first_day_of_week == other.first_day_of_week
    }
}

impl Eq for Calendar {}

#[cfg(test)]
mod test {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn quarter_start_months() {
        assert_eq!(Calendar::new(0, 1, 0).quarter_start_months(), [0, 3, 6, 9]);
        assert_eq!(Calendar::new(3, 1, 0).quarter_start_months(), [3, 6, 9, 0]);
        assert_eq!(Calendar::new(10, 1, 0).quarter_start_months(), [10, 1, 4, 7]);
    }

    #[test]
    fn quarter_start_date() {
        // April start
        let calendar = Calendar::new(3, 1, 0);
        assert_eq!(calendar.quarter_start_date(2016, 0), date(2016, 4, 1));
        assert_eq!(calendar.quarter_start_date(2016, 2), date(2016, 10, 1));
        assert_eq!(calendar.quarter_start_date(2016, 3), date(2017, 1, 1));

        // Calendar year
        let calendar = Calendar::default();
        assert_eq!(calendar.quarter_start_date(2016, 1), date(2016, 4, 1));
        assert_eq!(calendar.quarter_start_date(2016, 3), date(2016, 10, 1));
    }

    #[test]
    fn date_of_first_week() {
        // 1 Jan 2016 was a Friday, so the first Sunday is the 3rd
        let calendar = Calendar::new(0, 1, 0);
        assert_eq!(calendar.date_of_first_week(2016), date(2016, 1, 3));

        // First Monday
        let calendar = Calendar::new(0, 1, 1);
        assert_eq!(calendar.date_of_first_week(2016), date(2016, 1, 4));

        // Already on the right day
        let calendar = Calendar::new(0, 1, 5);
        assert_eq!(calendar.date_of_first_week(2016), date(2016, 1, 1));

        // Memoised value is returned the second time
        assert_eq!(calendar.date_of_first_week(2016), date(2016, 1, 1));
        assert_eq!(calendar.date_of_first_week.borrow().len(), 1);
    }

    #[test]
    fn clamped() {
        let calendar = Calendar::new(15, 40, 9);
        assert_eq!(calendar.first_month_of_year(), 11);
        assert_eq!(calendar.first_day_of_year(), 31);
        assert_eq!(calendar.first_day_of_week(), 6);

        let calendar = Calendar::new(0, 0, 0);
        assert_eq!(calendar.first_day_of_year(), 1);
    }

    #[test]
    fn is_changed() {
        let calendar = Calendar::from_settings(
            &CalendarSettings { month: 4, day: 1 },
            &WeekDaySettings { day: 1 },
        );
        assert!(!calendar.is_changed(
            &CalendarSettings { month: 4, day: 1 },
            &WeekDaySettings { day: 1 }
        ));
        assert!(calendar.is_changed(
            &CalendarSettings { month: 5, day: 1 },
            &WeekDaySettings { day: 1 }
        ));
        assert!(calendar.is_changed(
            &CalendarSettings { month: 4, day: 1 },
            &WeekDaySettings { day: 0 }
        ));
    }
}
