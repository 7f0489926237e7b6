// SPDX-License-Identifier: MIT

//!
//! The `timeslicer-engine` engine
//!

mod cursor;
mod events;
mod granularity;
mod granularity_data;
mod helpers;
mod labels;
mod period;
mod selection;

pub(crate) use helpers::*;

pub use cursor::*;
pub use events::*;
pub use granularity::*;
pub use granularity_data::*;
pub use labels::*;
pub use period::*;
pub use selection::*;

use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use timeslicer_core::{Calendar, DateExtent, GranularityType, RawDateValue, TimelineSettings};

/// The core `timeslicer-engine` engine.  This owns the granularities built
/// over the observed dates, the current selection, and the cursor state, and
/// emits events for the host to act on (e.g. to filter its data).
pub struct Engine {
    /// The (sanitised) settings currently applied
    settings: TimelineSettings,

    /// The fiscal calendar derived from the settings
    calendar: Calendar,

    /// The observed date extent (if any date was observed)
    extent: Option<DateExtent>,

    /// Every granularity built over the extent
    granularity_data: TimelineGranularityData,

    /// The granularity shown
    granularity: GranularityType,

    /// The selection within the current granularity.  `None` when there are
    /// no periods.
    selection: Option<SelectionState>,

    /// Which cursor (if any) is being dragged
    drag_state: DragState,

    /// Interaction events that can be drained by the host
    interaction_events: Vec<TimelineInteractionEvent>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(TimelineSettings::default())
    }
}

impl Engine {
    /// Create an engine with no dates
    pub fn new(settings: TimelineSettings) -> Self {
        let settings = settings.sanitised();
        let calendar = Calendar::from_settings(&settings.calendar, &settings.week_day);
        Self {
            granularity: settings.granularity,
            settings,
            calendar,
            extent: None,
            granularity_data: TimelineGranularityData::default(),
            selection: None,
            drag_state: DragState::Idle,
            interaction_events: Vec::new(),
        }
    }

    pub fn settings(&self) -> &TimelineSettings {
        &self.settings
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn extent(&self) -> Option<DateExtent> {
        self.extent
    }

    pub fn granularity_data(&self) -> &TimelineGranularityData {
        &self.granularity_data
    }

    pub fn current_granularity(&self) -> GranularityType {
        self.granularity
    }

    pub fn selection(&self) -> Option<&SelectionState> {
        self.selection.as_ref()
    }

    pub fn drag_state(&self) -> DragState {
        self.drag_state
    }

    /// The current granularity's periods
    pub fn periods(&self) -> &[DatePeriod] {
        self.granularity_data.granularity(self.granularity).periods()
    }

    /// The current granularity's label rows
    pub fn labels(&self) -> &ExtendedLabel {
        self.granularity_data
            .granularity(self.granularity)
            .extended_labels()
    }

    /// Apply new settings.  The granularities are only rebuilt if the fiscal
    /// calendar changed.
    pub fn set_settings(&mut self, settings: TimelineSettings) {
        let settings = settings.sanitised();
        let granularity = settings.granularity;
        let calendar_changed = self
            .calendar
            .is_changed(&settings.calendar, &settings.week_day);
        self.settings = settings;
        self.change_granularity(granularity);
        if calendar_changed {
            info!("Calendar changed, rebuilding granularities");
            self.calendar =
                Calendar::from_settings(&self.settings.calendar, &self.settings.week_day);
            self.rebuild();
        }
    }

    /// Observe the raw values of the date column.  Values that aren't dates
    /// are dropped.
    pub fn set_values(&mut self, values: &[RawDateValue]) {
        self.set_date_extent(DateExtent::from_values(values));
    }

    /// Set the observed date extent, rebuilding the granularities if it
    /// changed
    pub fn set_date_extent(&mut self, extent: Option<DateExtent>) {
        if extent == self.extent && !self.granularity_data.is_empty() {
            debug!("Date extent unchanged");
            return;
        }
        self.extent = extent;
        self.rebuild();
    }

    /// Rebuild every granularity and re-derive the selection.  A forced
    /// selection takes priority, then the previously selected dates, then the
    /// whole extent.
    pub fn rebuild(&mut self) {
        let previous_dates = self.selection_dates();
        self.drag_state = DragState::Idle;
        self.selection = None;
        self.granularity_data = TimelineGranularityData::build(self.extent, &self.calendar);
        if self.granularity_data.is_empty() {
            info!("No dates observed");
            if previous_dates.is_some() {
                self.interaction_events
                    .push(TimelineInteractionEvent::SelectionCleared);
            }
            return;
        }
        info!(
            "Built granularities for {} dates ({} {} periods)",
            self.granularity_data.dates().len(),
            self.periods().len(),
            self.granularity
        );

        if self.apply_forced_selection(Local::now().date_naive()) {
            return;
        }
        match previous_dates {
            Some((start, end)) => self.set_selection_dates(start, end),
            None => self.clear_selection(),
        }
    }

    /// Apply the forced selection configured in the settings.  Returns
    /// whether a selection was forced.
    pub fn apply_forced_selection(&mut self, today: NaiveDate) -> bool {
        let force_selection = self.settings.force_selection;
        if force_selection.current_period && self.select_current_period(today) {
            return true;
        }
        force_selection.latest_available_date && self.select_latest_period()
    }

    /// Select the period of the current granularity that contains `today`.
    /// Returns `false` if no period contains it.
    pub fn select_current_period(&mut self, today: NaiveDate) -> bool {
        let Some(index) = self.periods().iter().position(|period| period.contains(today)) else {
            debug!("No {} period contains {today}", self.granularity);
            return false;
        };
        let (start, end) = self.whole_period_dates(index);
        self.set_selection_dates(start, end);
        true
    }

    /// Select the last period of the current granularity
    pub fn select_latest_period(&mut self) -> bool {
        let Some(index) = self.periods().len().checked_sub(1) else {
            return false;
        };
        let (start, end) = self.whole_period_dates(index);
        self.set_selection_dates(start, end);
        true
    }

    /// Select every period
    pub fn clear_selection(&mut self) {
        let (Some(start), Some(end)) = (
            self.granularity_data.dates().first().copied(),
            self.granularity_data.ending_date(),
        ) else {
            self.selection = None;
            return;
        };
        self.set_selection_dates(start, end);
    }

    /// Select `[start, end)`.  The dates are clamped to the observed extent.
    pub fn set_selection_dates(&mut self, start: NaiveDate, end: NaiveDate) {
        let granularity = self.granularity_data.granularity_mut(self.granularity);
        unseparate_all(granularity.periods_mut());
        match separate_selection(granularity, start, end) {
            Ok(selection) => {
                self.selection = Some(selection);
                self.push_selection_changed();
            }
            Err(error) => {
                warn!("Unable to select {start} to {end}: {error}");
                self.selection = None;
            }
        }
    }

    /// The selected `[start, end)` dates
    pub fn selection_dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        let selection = self.selection.as_ref()?;
        let periods = self.periods();
        Some((
            selection.start_selection_date(periods)?,
            selection.end_selection_date(periods)?,
        ))
    }

    /// Switch granularity, keeping the selected dates
    pub fn change_granularity(&mut self, granularity: GranularityType) {
        if granularity == self.granularity {
            return;
        }
        let current = self.granularity;
        self.settings.granularity = granularity;
        self.granularity = granularity;
        self.drag_state = DragState::Idle;
        self.interaction_events
            .push(TimelineInteractionEvent::GranularityChanged(granularity));
        debug!("Granularity changed from {current} to {granularity}");

        let Some(previous) = self.selection else {
            return;
        };
        let periods = self.granularity_data.granularity(current).periods();
        let (Some(start), Some(end)) = (
            previous.start_selection_date(periods),
            previous.end_selection_date(periods),
        ) else {
            return;
        };
        match selection::change_granularity(
            &mut self.granularity_data,
            current,
            granularity,
            start,
            end,
        ) {
            Ok(selection) => self.selection = Some(selection),
            Err(error) => {
                warn!("Unable to keep selection {start} to {end}: {error}");
                self.selection = None;
            }
        }
    }

    /// Start dragging a cursor
    pub fn start_drag(&mut self, cursor: CursorIndex) {
        if self.selection.is_none() {
            return;
        }
        self.drag_state = DragState::Dragging(cursor);
        self.interaction_events
            .push(TimelineInteractionEvent::DragStarted(cursor));
    }

    /// Move the dragged cursor to the period under the pointer.  Returns
    /// whether the selection changed.
    pub fn drag_to(&mut self, position: f64, cell_width: f64) -> bool {
        let DragState::Dragging(cursor) = self.drag_state else {
            return false;
        };
        let Some(index) = self.index_at(position, cell_width) else {
            return false;
        };
        let periods = self.granularity_data.granularity(self.granularity).periods();
        let Some(selection) = self.selection.as_mut() else {
            return false;
        };
        let changed = selection.drag_cursor(cursor, index, periods);
        if changed {
            self.push_selection_changed();
        }
        changed
    }

    /// Stop dragging
    pub fn end_drag(&mut self) {
        if let DragState::Dragging(cursor) = self.drag_state {
            self.drag_state = DragState::Idle;
            self.interaction_events
                .push(TimelineInteractionEvent::DragEnded(cursor));
        }
    }

    /// Click on the period under the pointer.  `additive` extends the
    /// selection instead of replacing it.
    pub fn click(&mut self, position: f64, cell_width: f64, additive: bool) -> bool {
        match self.index_at(position, cell_width) {
            Some(index) => self.click_period(index, additive),
            None => false,
        }
    }

    /// Click on the period at `index`
    pub fn click_period(&mut self, index: usize, additive: bool) -> bool {
        let periods = self.granularity_data.granularity(self.granularity).periods();
        let changed = match self.selection.as_mut() {
            Some(selection) => selection.select_period(index, additive, periods),
            None => match SelectionState::from_indices(index, index, periods) {
                Ok(selection) => {
                    self.selection = Some(selection);
                    true
                }
                Err(error) => {
                    debug!("Click ignored: {error}");
                    false
                }
            },
        };
        if changed {
            self.push_selection_changed();
        }
        changed
    }

    /// The horizontal positions of the start & end cursors
    pub fn cursor_positions(&self, cell_width: f64) -> Option<[f64; 2]> {
        self.selection
            .as_ref()
            .map(|selection| selection.cursor_positions(cell_width))
    }

    /// The selection as text, e.g. `Aug 2016 - Sep 2016`
    pub fn time_range_text(&self) -> Option<String> {
        let selection = self.selection.as_ref()?;
        time_range_text(
            selection,
            self.granularity_data.granularity(self.granularity),
            &self.calendar,
        )
    }

    pub fn drain_interaction_events(&mut self) -> std::vec::Drain<'_, TimelineInteractionEvent> {
        self.interaction_events.drain(..)
    }

    /// The dates of the whole period that the (possibly split) period at
    /// `index` is part of
    fn whole_period_dates(&self, index: usize) -> (NaiveDate, NaiveDate) {
        let periods = self.periods();
        let original = periods[index].index.floor();
        let mut fragments = periods
            .iter()
            .filter(|period| period.index.floor() == original);
        let first = fragments.next().unwrap_or(&periods[index]);
        let last = fragments.last().unwrap_or(first);
        (first.start_date, last.end_date)
    }

    fn index_at(&self, position: f64, cell_width: f64) -> Option<usize> {
        get_index_by_position(&period_indices(self.periods()), cell_width, position, 0.0)
    }

    fn push_selection_changed(&mut self) {
        if let Some((start, end)) = self.selection_dates() {
            self.interaction_events
                .push(TimelineInteractionEvent::SelectionChanged { start, end });
        }
    }
}
