// SPDX-License-Identifier: MIT

//!
//! Selection: mapping a date range onto the periods of a granularity
//!
//! A selection boundary may fall inside a period, in which case the period is
//! split in two at the boundary so that the selection starts and ends exactly
//! on the selected dates.  Splits are undone (the fragments merged back)
//! before the selection is re-derived, e.g. when the granularity changes.
//!

use crate::{
    DatePeriod, Granularity, TimelineGranularityData, is_partial_ratio, snap_fraction,
};
use chrono::NaiveDate;
use log::{debug, trace, warn};
use serde::Serialize;
use thiserror::Error;
use timeslicer_core::{Calendar, GranularityType, next_day, prev_day};

/// Errors that indicate the selection engine was misused
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SelectionError {
    /// There are no periods to select
    #[error("There are no periods to select from")]
    NoPeriods,

    /// The index doesn't refer to a period
    #[error("Period index `{0}` is out of range")]
    PeriodIndexOutOfRange(usize),

    /// The start index is after the end index
    #[error("Selection start `{start}` is after selection end `{end}`")]
    InvertedRange { start: usize, end: usize },

    /// A split must leave a non-empty fraction on both sides
    #[error("Fraction `{0}` is not allowed")]
    InvalidFraction(f64),

    /// A split must fall strictly inside the period
    #[error("Split date `{0}` is not inside the period")]
    SplitDateOutsidePeriod(NaiveDate),
}

/// Which of the two selection cursors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CursorIndex {
    Start = 0,
    End = 1,
}

/// A cursor bound to a (possibly fractional) selection index
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CursorDataPoint {
    pub selection_index: f64,
    pub cursor_index: CursorIndex,
}

/// The selected periods of the current granularity, and the cursors bound to
/// the selection's edges.
///
/// The start index is never after the end index.  The start cursor sits at
/// the leading edge of the start period, and the end cursor at the trailing
/// edge of the end period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectionState {
    pub(crate) selection_start_index: usize,
    pub(crate) selection_end_index: usize,
    pub(crate) cursors: [CursorDataPoint; 2],
}

impl SelectionState {
    /// Select the periods from `start` to `end` (inclusive indices)
    pub fn from_indices(
        start: usize,
        end: usize,
        periods: &[DatePeriod],
    ) -> Result<Self, SelectionError> {
        if periods.is_empty() {
            return Err(SelectionError::NoPeriods);
        }
        if end >= periods.len() {
            return Err(SelectionError::PeriodIndexOutOfRange(end));
        }
        if start > end {
            return Err(SelectionError::InvertedRange { start, end });
        }
        let mut selection = Self {
            selection_start_index: start,
            selection_end_index: end,
            cursors: [
                CursorDataPoint {
                    selection_index: 0.0,
                    cursor_index: CursorIndex::Start,
                },
                CursorDataPoint {
                    selection_index: 0.0,
                    cursor_index: CursorIndex::End,
                },
            ],
        };
        selection.update_cursors(periods);
        Ok(selection)
    }

    pub fn selection_start_index(&self) -> usize {
        self.selection_start_index
    }

    pub fn selection_end_index(&self) -> usize {
        self.selection_end_index
    }

    pub fn cursors(&self) -> &[CursorDataPoint; 2] {
        &self.cursors
    }

    pub fn cursor(&self, cursor: CursorIndex) -> &CursorDataPoint {
        &self.cursors[cursor as usize]
    }

    /// Move the cursors to the edges of the selected periods
    pub(crate) fn update_cursors(&mut self, periods: &[DatePeriod]) {
        if let Some(start) = periods.get(self.selection_start_index) {
            self.cursors[CursorIndex::Start as usize].selection_index = start.index;
        }
        if let Some(end) = periods.get(self.selection_end_index) {
            self.cursors[CursorIndex::End as usize].selection_index = end.end_index();
        }
    }

    /// The first selected period
    pub fn start_selection_period<'a>(&self, periods: &'a [DatePeriod]) -> Option<&'a DatePeriod> {
        periods.get(self.selection_start_index)
    }

    /// The last selected period
    pub fn end_selection_period<'a>(&self, periods: &'a [DatePeriod]) -> Option<&'a DatePeriod> {
        periods.get(self.selection_end_index)
    }

    /// The first selected date
    pub fn start_selection_date(&self, periods: &[DatePeriod]) -> Option<NaiveDate> {
        self.start_selection_period(periods)
            .map(|period| period.start_date)
    }

    /// The day after the last selected date
    pub fn end_selection_date(&self, periods: &[DatePeriod]) -> Option<NaiveDate> {
        self.end_selection_period(periods).map(|period| period.end_date)
    }
}

/// The proportion of the period's span between the date and the period's
/// start (or end), clamped to `[0, 1]`.  Zero for a period with no span.
pub fn get_date_ratio(period: &DatePeriod, date: NaiveDate, from_start: bool) -> f64 {
    let period_days = period.day_count();
    if period_days == 0 {
        return 0.0;
    }
    let date_days = if from_start {
        (date - period.start_date).num_days()
    } else {
        (period.end_date - date).num_days()
    };
    (date_days as f64 / period_days as f64).clamp(0.0, 1.0)
}

/// Select `[start_date, end_date)` in the granularity, splitting the periods
/// at either end if the dates fall inside them.
///
/// Dates outside the granularity's periods are clamped to the first/last
/// period.  An empty range is widened to a single day.  The periods must not
/// already be split.
pub fn separate_selection(
    granularity: &mut Granularity,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<SelectionState, SelectionError> {
    let periods = granularity.periods();
    let Some(last_index) = periods.len().checked_sub(1) else {
        return Err(SelectionError::NoPeriods);
    };
    let end_date = if end_date <= start_date {
        warn!("empty selection {start_date} to {end_date} widened to a day");
        next_day(start_date)
    } else {
        end_date
    };

    let mut start_index = periods
        .iter()
        .position(|period| start_date < period.end_date)
        .unwrap_or(last_index);
    let mut end_index = periods
        .iter()
        .position(|period| end_date <= period.end_date)
        .unwrap_or(last_index);

    // Both ratios are measured before anything is split
    let start_ratio = get_date_ratio(&periods[start_index], start_date, true);
    let start_fraction = start_ratio * periods[start_index].fraction;
    let end_ratio = get_date_ratio(&periods[end_index], end_date, false);
    let end_fraction = end_ratio * periods[end_index].fraction;

    // The end must be split first so that the start's index doesn't drift
    if is_partial_ratio(end_ratio) {
        granularity.split_period(end_index, end_fraction, end_date)?;
    }
    if is_partial_ratio(start_ratio) {
        let new_fraction = granularity.periods()[start_index].fraction - start_fraction;
        granularity.split_period(start_index, new_fraction, start_date)?;
        start_index += 1;
        end_index += 1;
    }

    debug!(
        "{} selection {start_date} to {end_date} is periods {start_index} to {end_index}",
        granularity.kind()
    );
    SelectionState::from_indices(start_index, end_index, granularity.periods())
}

/// Merge the first split period with its successor.  Returns whether a merge
/// happened.  Call until it returns `false` to undo both of a selection's
/// splits.
pub fn unseparate_selection(periods: &mut Vec<DatePeriod>) -> bool {
    let Some(index) = periods.iter().position(|period| period.is_split()) else {
        return false;
    };
    if index + 1 >= periods.len() {
        return false;
    }
    let next = periods.remove(index + 1);
    let period = &mut periods[index];
    period.end_date = next.end_date;
    period.fraction = snap_fraction(period.fraction + next.fraction);
    trace!("merged split period {index}");
    true
}

/// Undo every split.  Returns the number of merges.
pub fn unseparate_all(periods: &mut Vec<DatePeriod>) -> usize {
    let mut merges = 0;
    while merges < periods.len() && unseparate_selection(periods) {
        merges += 1;
    }
    merges
}

/// Switch the selection of `[start_date, end_date)` from one granularity to
/// another.  The splits of the old granularity are undone, and the new
/// granularity is split so that the selection keeps the same dates.
pub fn change_granularity(
    data: &mut TimelineGranularityData,
    current: GranularityType,
    new: GranularityType,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<SelectionState, SelectionError> {
    unseparate_all(data.granularity_mut(current).periods_mut());
    let granularity = data.granularity_mut(new);
    unseparate_all(granularity.periods_mut());
    separate_selection(granularity, start_date, end_date)
}

/// The selection as the identifiers of its first & last days, e.g.
/// `Aug 2016 - Sep 2016`
pub fn time_range_text(
    selection: &SelectionState,
    granularity: &Granularity,
    calendar: &Calendar,
) -> Option<String> {
    let periods = granularity.periods();
    let start = selection.start_selection_date(periods)?;
    let end = prev_day(selection.end_selection_date(periods)?);
    let join = |date| {
        granularity
            .split_date(date, calendar)
            .iter()
            .map(|identifier| identifier.to_string())
            .collect::<Vec<String>>()
            .join(" ")
    };
    Some(format!("{} - {}", join(start), join(end)))
}

/// The period's first & last days, e.g. `Mon Aug 01 2016 - Wed Aug 31 2016`
pub fn date_range_text(period: &DatePeriod) -> String {
    format!(
        "{} - {}",
        period.start_date.format("%a %b %d %Y"),
        prev_day(period.end_date).format("%a %b %d %Y")
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use timeslicer_core::DateExtent;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn year_2016() -> TimelineGranularityData {
        TimelineGranularityData::build(
            Some(DateExtent::new(date(2016, 1, 1), date(2016, 12, 31))),
            &Calendar::default(),
        )
    }

    fn fraction_sum(periods: &[DatePeriod], original_index: f64) -> f64 {
        periods
            .iter()
            .filter(|period| period.index.floor() == original_index)
            .map(|period| period.fraction)
            .sum()
    }

    #[test]
    fn date_ratio() {
        let data = year_2016();
        let august = &data.granularity(GranularityType::Month).periods()[7];
        assert_eq!(get_date_ratio(august, date(2016, 8, 1), true), 0.0);
        assert_eq!(get_date_ratio(august, date(2016, 8, 16), false), 16.0 / 31.0);
        assert_eq!(get_date_ratio(august, date(2016, 8, 15), true), 14.0 / 31.0);

        // Clamped
        assert_eq!(get_date_ratio(august, date(2016, 1, 1), true), 0.0);
        assert_eq!(get_date_ratio(august, date(2016, 12, 1), true), 1.0);

        // No span
        let mut empty = august.clone();
        empty.end_date = empty.start_date;
        assert_eq!(get_date_ratio(&empty, date(2016, 8, 15), true), 0.0);
    }

    #[test]
    fn single_day_inside_a_month() {
        let mut data = year_2016();
        let granularity = data.granularity_mut(GranularityType::Month);
        let selection =
            separate_selection(granularity, date(2016, 8, 15), date(2016, 8, 16)).unwrap();
        let periods = granularity.periods();

        assert_eq!(periods.len(), 14);
        assert_eq!(selection.selection_start_index(), 8);
        assert_eq!(selection.selection_end_index(), 8);
        assert_eq!(periods[8].start_date, date(2016, 8, 15));
        assert_eq!(periods[8].end_date, date(2016, 8, 16));
        assert!((fraction_sum(periods, 7.0) - 1.0).abs() < 1e-9);

        // Cursors
        assert_eq!(selection.cursor(CursorIndex::Start).selection_index, periods[8].index);
        assert_eq!(
            selection.cursor(CursorIndex::End).selection_index,
            periods[8].index + periods[8].fraction
        );

        // Dates
        assert_eq!(selection.start_selection_date(periods), Some(date(2016, 8, 15)));
        assert_eq!(selection.end_selection_date(periods), Some(date(2016, 8, 16)));
    }

    #[test]
    fn boundaries_in_different_periods() {
        let mut data = year_2016();
        let granularity = data.granularity_mut(GranularityType::Month);
        let selection =
            separate_selection(granularity, date(2016, 3, 10), date(2016, 5, 20)).unwrap();
        let periods = granularity.periods();

        assert_eq!(periods.len(), 14);
        assert_eq!(selection.selection_start_index(), 3);
        assert_eq!(selection.selection_end_index(), 5);
        assert_eq!(periods[3].start_date, date(2016, 3, 10));
        assert_eq!(periods[5].end_date, date(2016, 5, 20));
        assert!((fraction_sum(periods, 2.0) - 1.0).abs() < 1e-9);
        assert!((fraction_sum(periods, 4.0) - 1.0).abs() < 1e-9);

        // Ordered by index
        for pair in periods.windows(2) {
            assert!(pair[0].index < pair[1].index);
            assert_eq!(pair[0].end_date, pair[1].start_date);
        }
    }

    #[test]
    fn aligned_range_isnt_split() {
        let mut data = year_2016();
        let granularity = data.granularity_mut(GranularityType::Month);
        let selection =
            separate_selection(granularity, date(2016, 2, 1), date(2016, 4, 1)).unwrap();
        assert_eq!(granularity.periods().len(), 12);
        assert_eq!(selection.selection_start_index(), 1);
        assert_eq!(selection.selection_end_index(), 2);
    }

    #[test]
    fn round_trip() {
        let original = year_2016();
        for kind in GranularityType::ALL {
            let mut data = original.clone();
            let granularity = data.granularity_mut(kind);
            separate_selection(granularity, date(2016, 2, 17), date(2016, 10, 3)).unwrap();
            let merged = unseparate_selection(granularity.periods_mut());
            assert!(merged || kind == GranularityType::Day);
            unseparate_all(granularity.periods_mut());
            assert_eq!(granularity.periods(), original.granularity(kind).periods());
            assert!(!unseparate_selection(granularity.periods_mut()));
        }
    }

    #[test]
    fn clamped_to_extent() {
        let mut data = year_2016();
        let granularity = data.granularity_mut(GranularityType::Day);

        // Entirely before
        let selection =
            separate_selection(granularity, date(2015, 1, 1), date(2015, 2, 1)).unwrap();
        assert_eq!(selection.selection_start_index(), 0);
        assert_eq!(selection.selection_end_index(), 0);

        // Entirely after
        let selection =
            separate_selection(granularity, date(2018, 1, 1), date(2018, 2, 1)).unwrap();
        assert_eq!(selection.selection_start_index(), 365);
        assert_eq!(selection.selection_end_index(), 365);

        // Overlapping both ends
        let selection =
            separate_selection(granularity, date(2015, 1, 1), date(2018, 2, 1)).unwrap();
        assert_eq!(selection.selection_start_index(), 0);
        assert_eq!(selection.selection_end_index(), 365);
        assert_eq!(granularity.periods().len(), 366);
    }

    #[test]
    fn empty_range_is_widened() {
        let mut data = year_2016();
        let granularity = data.granularity_mut(GranularityType::Day);
        let selection =
            separate_selection(granularity, date(2016, 3, 1), date(2016, 3, 1)).unwrap();
        assert_eq!(selection.selection_start_index(), 60);
        assert_eq!(selection.selection_end_index(), 60);
    }

    #[test]
    fn no_periods() {
        let mut data = TimelineGranularityData::build(None, &Calendar::default());
        assert_eq!(
            separate_selection(
                data.granularity_mut(GranularityType::Day),
                date(2016, 1, 1),
                date(2016, 2, 1)
            ),
            Err(SelectionError::NoPeriods)
        );
        assert_eq!(
            SelectionState::from_indices(0, 0, &[]),
            Err(SelectionError::NoPeriods)
        );
    }

    #[test]
    fn from_indices() {
        let data = year_2016();
        let periods = data.granularity(GranularityType::Month).periods();
        assert_eq!(
            SelectionState::from_indices(3, 2, periods),
            Err(SelectionError::InvertedRange { start: 3, end: 2 })
        );
        assert_eq!(
            SelectionState::from_indices(0, 12, periods),
            Err(SelectionError::PeriodIndexOutOfRange(12))
        );
        let selection = SelectionState::from_indices(2, 4, periods).unwrap();
        assert_eq!(selection.cursor(CursorIndex::Start).selection_index, 2.0);
        assert_eq!(selection.cursor(CursorIndex::End).selection_index, 5.0);
    }

    #[test]
    fn granularity_switch_keeps_dates() {
        let mut data = year_2016();
        let (start, end) = (date(2016, 3, 10), date(2016, 5, 20));
        let mut current = GranularityType::Day;
        separate_selection(data.granularity_mut(current), start, end).unwrap();
        for new in [
            GranularityType::Month,
            GranularityType::Week,
            GranularityType::Year,
            GranularityType::Quarter,
            GranularityType::Day,
        ] {
            let selection = change_granularity(&mut data, current, new, start, end).unwrap();
            let periods = data.granularity(new).periods();
            assert_eq!(selection.start_selection_date(periods), Some(start), "{new}");
            assert_eq!(selection.end_selection_date(periods), Some(end), "{new}");
            let previous = data.granularity(current).periods();
            assert!(!previous.iter().any(|period| period.is_split()));
            current = new;
        }
        assert_eq!(data.granularity(GranularityType::Day).periods().len(), 366);
    }

    #[test]
    fn text() {
        let calendar = Calendar::default();
        let mut data = year_2016();
        let granularity = data.granularity_mut(GranularityType::Month);
        let selection =
            separate_selection(granularity, date(2016, 8, 1), date(2016, 10, 1)).unwrap();
        assert_eq!(
            time_range_text(&selection, granularity, &calendar),
            Some("Aug 2016 - Sep 2016".to_string())
        );
        assert_eq!(
            date_range_text(&granularity.periods()[7]),
            "Mon Aug 01 2016 - Wed Aug 31 2016"
        );

        let granularity = data.granularity_mut(GranularityType::Day);
        let selection =
            separate_selection(granularity, date(2016, 8, 15), date(2016, 8, 21)).unwrap();
        assert_eq!(
            time_range_text(&selection, granularity, &calendar),
            Some("Aug 15 2016 - Aug 20 2016".to_string())
        );
    }
}
