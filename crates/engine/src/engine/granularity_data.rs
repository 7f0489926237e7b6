// SPDX-License-Identifier: MIT

//!
//! All granularities over the observed date extent
//!

use crate::{ExtendedLabel, Granularity};
use chrono::NaiveDate;
use log::debug;
use timeslicer_core::{Calendar, DateExtent, GranularityType, dates_between, next_day};

/// Every granularity, built over every date in the observed extent
#[derive(Debug, Clone)]
pub struct TimelineGranularityData {
    /// Every date in the extent (inclusive)
    dates: Vec<NaiveDate>,

    /// The day after the last date
    ending_date: Option<NaiveDate>,

    /// Indexed by [`GranularityType::index`]
    granularities: Vec<Granularity>,
}

impl Default for TimelineGranularityData {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TimelineGranularityData {
    /// Create the granularities (without building them) for the extent
    pub fn new(extent: Option<DateExtent>) -> Self {
        let dates = match extent {
            Some(extent) => dates_between(extent.start, extent.end),
            None => Vec::new(),
        };
        let ending_date = dates.last().map(|date| next_day(*date));
        Self {
            dates,
            ending_date,
            granularities: GranularityType::ALL.map(Granularity::new).to_vec(),
        }
    }

    /// Create & build all granularities and their labels for the extent
    pub fn build(extent: Option<DateExtent>, calendar: &Calendar) -> Self {
        let mut data = Self::new(extent);
        data.create_granularities(calendar);
        data.create_labels(calendar);
        data
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn ending_date(&self) -> Option<NaiveDate> {
        self.ending_date
    }

    /// Whether there are no dates (and therefore no periods)
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn granularity(&self, kind: GranularityType) -> &Granularity {
        &self.granularities[kind.index()]
    }

    pub fn granularity_mut(&mut self, kind: GranularityType) -> &mut Granularity {
        &mut self.granularities[kind.index()]
    }

    /// Reset the granularity and stream every date through it
    pub fn add_granularity(&mut self, kind: GranularityType, calendar: &Calendar) {
        let granularity = &mut self.granularities[kind.index()];
        granularity.reset();
        let Some(ending_date) = self.ending_date else {
            return;
        };
        for date in &self.dates {
            let identifiers = granularity.split_date(*date, calendar);
            granularity.add_date(*date, identifiers, calendar);
        }
        granularity.set_new_end_date(ending_date);
        debug!("{kind} granularity has {} periods", granularity.periods().len());
    }

    /// Build all granularities, coarsest first
    pub fn create_granularities(&mut self, calendar: &Calendar) {
        for kind in GranularityType::ALL {
            self.add_granularity(kind, calendar);
        }
    }

    /// Build each granularity's label rows for itself and every coarser
    /// granularity
    pub fn create_labels(&mut self, calendar: &Calendar) {
        for granularity in self.granularities.iter_mut() {
            let mut extended_labels = ExtendedLabel::default();
            for labeller in GranularityType::ALL {
                if granularity.kind().is_at_least_as_fine_as(labeller) {
                    let labels = granularity.create_labels(labeller, calendar);
                    extended_labels.set_labels(labeller, labels);
                }
            }
            granularity.set_extended_labels(extended_labels);
        }
    }
}
