// SPDX-License-Identifier: MIT

//!
//! Granularities: how dates are bucketed into periods & how periods are
//! labelled
//!

use crate::{
    DatePeriod, ExtendedLabel, Identifier, SelectionError, TimelineLabel, WeekNumber,
};
use chrono::{Datelike, NaiveDate};
use log::{trace, warn};
use timeslicer_core::{
    Calendar, GranularityType, date_from_parts, days_in_month, prev_day, short_month_name,
};

/// Quarters are found by stepping backwards from the last quarter of the
/// date's calendar year.  Any sane calendar finds the quarter within 8 steps.
const MAX_QUARTER_STEPS: usize = 12;

/// The bucketing & labelling rules of each granularity
pub trait Bucketing {
    /// The identifier of the period the date falls in
    fn split_date(&self, date: NaiveDate, calendar: &Calendar) -> Vec<Identifier>;

    /// Whether both periods would be given the same label
    fn same_label(&self, a: &DatePeriod, b: &DatePeriod, calendar: &Calendar) -> bool;

    /// The label for the period
    fn generate_label(&self, period: &DatePeriod, calendar: &Calendar) -> TimelineLabel;
}

impl Bucketing for GranularityType {
    fn split_date(&self, date: NaiveDate, calendar: &Calendar) -> Vec<Identifier> {
        match self {
            GranularityType::Year => vec![determine_year(date, calendar).into()],
            GranularityType::Quarter => vec![
                quarter_text(date, calendar).into(),
                determine_year(date, calendar).into(),
            ],
            GranularityType::Month => vec![short_month_name(date).into(), date.year().into()],
            GranularityType::Week => {
                let week = determine_week(date, calendar);
                vec![week.number.into(), week.year.into()]
            }
            GranularityType::Day => vec![
                short_month_name(date).into(),
                date.day().into(),
                date.year().into(),
            ],
        }
    }

    fn same_label(&self, a: &DatePeriod, b: &DatePeriod, calendar: &Calendar) -> bool {
        match self {
            GranularityType::Year => a.year == b.year,
            GranularityType::Quarter => {
                a.year == b.year
                    && determine_quarter(a.start_date, calendar)
                        == determine_quarter(b.start_date, calendar)
            }
            GranularityType::Month => {
                short_month_name(a.start_date) == short_month_name(b.start_date)
            }
            GranularityType::Week => a.week == b.week,
            GranularityType::Day => a.start_date == b.start_date,
        }
    }

    fn generate_label(&self, period: &DatePeriod, calendar: &Calendar) -> TimelineLabel {
        let date = period.start_date;
        let (title, text) = match self {
            GranularityType::Year => {
                let text = format!("Year {}", period.year);
                (text.clone(), text)
            }
            GranularityType::Quarter => {
                let quarter = quarter_text(date, calendar);
                (format!("{quarter} {}", period.year), quarter)
            }
            GranularityType::Month => {
                let month = short_month_name(date);
                (format!("{month} {}", date.year()), month.to_string())
            }
            GranularityType::Week => (
                format!("Week {} - {}", period.week.number, period.week.year),
                format!("W{}", period.week.number),
            ),
            GranularityType::Day => (
                date.format("%a %b %d %Y").to_string(),
                date.day().to_string(),
            ),
        };
        TimelineLabel {
            title,
            text,
            id: period.index,
        }
    }
}

/// The fiscal year the date falls in.  Dates before the start of their
/// calendar year's fiscal year belong to the previous fiscal year.
pub fn determine_year(date: NaiveDate, calendar: &Calendar) -> i32 {
    if calendar.year_start_date(date.year()) <= date {
        date.year()
    } else {
        date.year() - 1
    }
}

/// The fiscal week the date falls in, counted from the first week date of the
/// latest year whose first week date isn't after the date
pub fn determine_week(date: NaiveDate, calendar: &Calendar) -> WeekNumber {
    let mut year = date.year();
    let mut date_of_first_week = calendar.date_of_first_week(year);
    while date < date_of_first_week {
        year -= 1;
        date_of_first_week = calendar.date_of_first_week(year);
    }
    WeekNumber {
        number: 1 + count_days(date_of_first_week, date) / 7,
        year,
    }
}

/// The fiscal quarter (1 to 4) the date falls in
pub fn determine_quarter(date: NaiveDate, calendar: &Calendar) -> u32 {
    let mut quarter: usize = 3;
    let mut year = date.year();
    for _ in 0..MAX_QUARTER_STEPS {
        if date >= calendar.quarter_start_date(year, quarter) {
            return quarter as u32 + 1;
        }
        if quarter > 0 {
            quarter -= 1;
        } else {
            quarter = 3;
            year -= 1;
        }
    }
    warn!("gave up looking for the quarter of {date} after {MAX_QUARTER_STEPS} steps");
    quarter as u32 + 1
}

/// e.g. `Q3`
pub fn quarter_text(date: NaiveDate, calendar: &Calendar) -> String {
    format!("Q{}", determine_quarter(date, calendar))
}

/// Count the days from `start` to `end` by walking back from `end` a month at
/// a time.  Within a single month the day numbers are simply subtracted.
fn count_days(start: NaiveDate, end: NaiveDate) -> i64 {
    if start > end {
        return (end - start).num_days();
    }
    if start.year() == end.year() && start.month() == end.month() {
        return i64::from(end.day()) - i64::from(start.day());
    }

    // Days elapsed in the end date's month
    let mut days = i64::from(end.day());

    // Whole months in between
    let mut month = prev_day(date_from_parts(end.year(), end.month0(), 1));
    while (month.year(), month.month()) != (start.year(), start.month()) {
        days += i64::from(days_in_month(month));
        month = prev_day(date_from_parts(month.year(), month.month0(), 1));
    }

    // Days remaining in the start date's month
    days + i64::from(days_in_month(month)) - i64::from(start.day())
}

/// A granularity and the ordered periods it bucketed the observed dates into
#[derive(Debug, Clone)]
pub struct Granularity {
    kind: GranularityType,
    periods: Vec<DatePeriod>,
    extended_labels: ExtendedLabel,
}

impl Granularity {
    pub fn new(kind: GranularityType) -> Self {
        Self {
            kind,
            periods: Vec::new(),
            extended_labels: ExtendedLabel::default(),
        }
    }

    pub fn kind(&self) -> GranularityType {
        self.kind
    }

    pub fn periods(&self) -> &[DatePeriod] {
        &self.periods
    }

    pub(crate) fn periods_mut(&mut self) -> &mut Vec<DatePeriod> {
        &mut self.periods
    }

    pub fn extended_labels(&self) -> &ExtendedLabel {
        &self.extended_labels
    }

    pub(crate) fn set_extended_labels(&mut self, extended_labels: ExtendedLabel) {
        self.extended_labels = extended_labels;
    }

    /// Remove all periods & labels
    pub fn reset(&mut self) {
        self.periods.clear();
        self.extended_labels = ExtendedLabel::default();
    }

    /// The identifier of the period the date falls in
    pub fn split_date(&self, date: NaiveDate, calendar: &Calendar) -> Vec<Identifier> {
        self.kind.split_date(date, calendar)
    }

    /// Add the next (inclusive) date.  A new period is started if the
    /// identifier differs from the last period's, in which case the last
    /// period is closed at this date.
    pub fn add_date(&mut self, date: NaiveDate, identifiers: Vec<Identifier>, calendar: &Calendar) {
        if let Some(last) = self.periods.last_mut() {
            last.end_date = date;
            if last.identifiers == identifiers {
                return;
            }
        }
        let index = self.periods.len() as f64;
        self.periods.push(DatePeriod {
            identifiers,
            start_date: date,
            end_date: date,
            year: determine_year(date, calendar),
            week: determine_week(date, calendar),
            fraction: 1.0,
            index,
        });
    }

    /// Set the (exclusive) end date of the final period
    pub fn set_new_end_date(&mut self, date: NaiveDate) {
        if let Some(last) = self.periods.last_mut() {
            last.end_date = date;
        }
    }

    /// Split the period at `index` in two at `new_date`.  The new period is
    /// inserted after the original and takes `new_fraction` of the original's
    /// fraction.
    pub fn split_period(
        &mut self,
        index: usize,
        new_fraction: f64,
        new_date: NaiveDate,
    ) -> Result<(), SelectionError> {
        let period = self
            .periods
            .get_mut(index)
            .ok_or(SelectionError::PeriodIndexOutOfRange(index))?;
        if !(new_fraction > 0.0 && new_fraction < period.fraction) {
            return Err(SelectionError::InvalidFraction(new_fraction));
        }
        if !(period.start_date < new_date && new_date < period.end_date) {
            return Err(SelectionError::SplitDateOutsidePeriod(new_date));
        }
        trace!("{} split period {index} at {new_date}", self.kind);

        period.fraction -= new_fraction;
        let new_period = DatePeriod {
            identifiers: period.identifiers.clone(),
            start_date: new_date,
            end_date: period.end_date,
            year: period.year,
            week: period.week,
            fraction: new_fraction,
            index: period.index + period.fraction,
        };
        period.end_date = new_date;
        self.periods.insert(index + 1, new_period);
        Ok(())
    }

    /// Label this granularity's periods using another granularity's rules.  A
    /// new label is started whenever a period doesn't share the label of the
    /// period that started the last label.
    pub fn create_labels(
        &self,
        labeller: GranularityType,
        calendar: &Calendar,
    ) -> Vec<TimelineLabel> {
        let mut labels = Vec::new();
        let mut label_start: Option<&DatePeriod> = None;
        for period in &self.periods {
            let is_same = label_start
                .is_some_and(|label_start| labeller.same_label(period, label_start, calendar));
            if !is_same {
                label_start = Some(period);
                labels.push(labeller.generate_label(period, calendar));
            }
        }
        labels
    }
}
