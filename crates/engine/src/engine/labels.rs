// SPDX-License-Identifier: MIT

//!
//! Labels
//!

use serde::Serialize;
use timeslicer_core::GranularityType;

/// Information needed to draw a label on the timeline's axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineLabel {
    pub title: String,
    pub text: String,

    /// The index of the first period the label covers
    pub id: f64,
}

/// The label rows for a granularity.  Only the rows for granularities at
/// least as coarse as the granularity itself are populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtendedLabel {
    pub day_labels: Vec<TimelineLabel>,
    pub week_labels: Vec<TimelineLabel>,
    pub month_labels: Vec<TimelineLabel>,
    pub quarter_labels: Vec<TimelineLabel>,
    pub year_labels: Vec<TimelineLabel>,
}

impl ExtendedLabel {
    /// The label row for the granularity
    pub fn labels(&self, granularity: GranularityType) -> &[TimelineLabel] {
        match granularity {
            GranularityType::Year => &self.year_labels,
            GranularityType::Quarter => &self.quarter_labels,
            GranularityType::Month => &self.month_labels,
            GranularityType::Week => &self.week_labels,
            GranularityType::Day => &self.day_labels,
        }
    }

    pub(crate) fn set_labels(&mut self, granularity: GranularityType, labels: Vec<TimelineLabel>) {
        match granularity {
            GranularityType::Year => self.year_labels = labels,
            GranularityType::Quarter => self.quarter_labels = labels,
            GranularityType::Month => self.month_labels = labels,
            GranularityType::Week => self.week_labels = labels,
            GranularityType::Day => self.day_labels = labels,
        }
    }
}
