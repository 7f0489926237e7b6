// SPDX-License-Identifier: MIT

//!
//! Cursors: mapping pointer positions onto periods & moving the selection
//!

use crate::{CursorIndex, DatePeriod, SelectionState};
use log::trace;
use serde::Serialize;

/// Whether a cursor is being dragged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(CursorIndex),
}

/// The element `i` whose interval
/// `[(elements[i] + offset) * width, (elements[i + 1] + offset) * width)` contains
/// the position.  Positions before the first element map to the
/// first element and positions after the last element map to the last.
///
/// The elements are ascending (fractional) indices, e.g. the indices of a
/// granularity's periods, and `width` is the width of one whole index.
pub fn get_index_by_position(
    elements: &[f64],
    width: f64,
    position: f64,
    offset: f64,
) -> Option<usize> {
    let last = elements.len().checked_sub(1)?;
    let left_edge = |i: usize| (elements[i] + offset) * width;
    if position < left_edge(0) {
        return Some(0);
    }
    if position >= left_edge(last) {
        return Some(last);
    }

    // Find the first element whose left edge is after the position
    let (mut low, mut high) = (0, last);
    while high - low > 1 {
        let mid = low + (high - low) / 2;
        if left_edge(mid) <= position {
            low = mid;
        } else {
            high = mid;
        }
    }
    Some(low)
}

/// The indices of the periods, for [`get_index_by_position`]
pub fn period_indices(periods: &[DatePeriod]) -> Vec<f64> {
    periods.iter().map(|period| period.index).collect()
}

impl SelectionState {
    /// Move a cursor onto the period at `index`.  The move is refused (and
    /// `false` returned) if the start would pass the end, or vice versa.
    pub fn drag_cursor(
        &mut self,
        cursor: CursorIndex,
        index: usize,
        periods: &[DatePeriod],
    ) -> bool {
        if index >= periods.len() {
            return false;
        }
        let accepted = match cursor {
            CursorIndex::Start => index <= self.selection_end_index,
            CursorIndex::End => index >= self.selection_start_index,
        };
        if !accepted {
            trace!("{cursor:?} cursor drag to {index} refused");
            return false;
        }
        let changed = match cursor {
            CursorIndex::Start => self.selection_start_index != index,
            CursorIndex::End => self.selection_end_index != index,
        };
        match cursor {
            CursorIndex::Start => self.selection_start_index = index,
            CursorIndex::End => self.selection_end_index = index,
        }
        self.update_cursors(periods);
        changed
    }

    /// Select the period at `index`.  Without `additive` the selection
    /// collapses onto the period.  With it the selection is extended: the end
    /// moves if the period is after the end, otherwise the start moves.
    ///
    /// Returns whether the selection changed.
    pub fn select_period(&mut self, index: usize, additive: bool, periods: &[DatePeriod]) -> bool {
        if index >= periods.len() {
            return false;
        }
        let previous = (self.selection_start_index, self.selection_end_index);
        if !additive {
            self.selection_start_index = index;
            self.selection_end_index = index;
        } else if self.selection_end_index < index {
            self.selection_end_index = index;
        } else {
            self.selection_start_index = index;
        }
        self.update_cursors(periods);
        previous != (self.selection_start_index, self.selection_end_index)
    }

    /// The horizontal positions of the start & end cursors
    pub fn cursor_positions(&self, cell_width: f64) -> [f64; 2] {
        self.cursors.map(|cursor| cursor.selection_index * cell_width)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{TimelineGranularityData, separate_selection};
    use chrono::NaiveDate;
    use timeslicer_core::{Calendar, DateExtent, GranularityType};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn months_2016() -> Vec<DatePeriod> {
        let data = TimelineGranularityData::build(
            Some(DateExtent::new(date(2016, 1, 1), date(2016, 12, 31))),
            &Calendar::default(),
        );
        data.granularity(GranularityType::Month).periods().to_vec()
    }

    #[test]
    fn index_by_position() {
        let elements = [0.0, 1.0, 2.0, 3.0, 3.14, 4.0, 4.15, 5.0];
        assert_eq!(get_index_by_position(&elements, 25.0, 80.0, 0.0), Some(4));
        assert_eq!(get_index_by_position(&elements, 25.0, 78.5, 0.0), Some(4));
        assert_eq!(get_index_by_position(&elements, 25.0, 0.0, 0.0), Some(0));
        assert_eq!(get_index_by_position(&elements, 25.0, 24.9, 0.0), Some(0));
        assert_eq!(get_index_by_position(&elements, 25.0, 25.0, 0.0), Some(1));
        assert_eq!(get_index_by_position(&elements, 25.0, 110.0, 0.0), Some(6));

        // Clamped
        assert_eq!(get_index_by_position(&elements, 25.0, -10.0, 0.0), Some(0));
        assert_eq!(get_index_by_position(&elements, 25.0, 1000.0, 0.0), Some(7));

        // Offset
        assert_eq!(get_index_by_position(&elements, 25.0, 80.0, 1.0), Some(2));

        assert_eq!(get_index_by_position(&[], 25.0, 80.0, 0.0), None);
        assert_eq!(get_index_by_position(&[2.0], 25.0, 0.0, 0.0), Some(0));
    }

    #[test]
    fn drag_is_monotonic() {
        let periods = months_2016();
        let mut selection = SelectionState::from_indices(3, 5, &periods).unwrap();

        // The start can't pass the end
        assert!(!selection.drag_cursor(CursorIndex::Start, 6, &periods));
        assert_eq!(selection.selection_start_index(), 3);
        assert!(selection.drag_cursor(CursorIndex::Start, 5, &periods));
        assert_eq!(selection.selection_start_index(), 5);

        // The end can't pass the start
        assert!(!selection.drag_cursor(CursorIndex::End, 4, &periods));
        assert_eq!(selection.selection_end_index(), 5);
        assert!(selection.drag_cursor(CursorIndex::End, 11, &periods));
        assert_eq!(selection.cursor(CursorIndex::End).selection_index, 12.0);

        // Out of range
        assert!(!selection.drag_cursor(CursorIndex::End, 12, &periods));

        // No movement
        assert!(!selection.drag_cursor(CursorIndex::End, 11, &periods));
        assert!(selection.selection_start_index() <= selection.selection_end_index());
    }

    #[test]
    fn click() {
        let periods = months_2016();
        let mut selection = SelectionState::from_indices(3, 5, &periods).unwrap();

        // Collapse
        assert!(selection.select_period(8, false, &periods));
        assert_eq!(selection.selection_start_index(), 8);
        assert_eq!(selection.selection_end_index(), 8);
        assert_eq!(selection.cursor_positions(10.0), [80.0, 90.0]);

        // Extend the end
        assert!(selection.select_period(10, true, &periods));
        assert_eq!(selection.selection_start_index(), 8);
        assert_eq!(selection.selection_end_index(), 10);

        // Extend the start
        assert!(selection.select_period(2, true, &periods));
        assert_eq!(selection.selection_start_index(), 2);
        assert_eq!(selection.selection_end_index(), 10);

        // Inside the selection moves the start
        assert!(selection.select_period(4, true, &periods));
        assert_eq!(selection.selection_start_index(), 4);
        assert!(!selection.select_period(4, true, &periods));
        assert!(!selection.select_period(40, false, &periods));
    }

    #[test]
    fn split_cursor_positions() {
        let mut data = TimelineGranularityData::build(
            Some(DateExtent::new(date(2016, 1, 1), date(2016, 12, 31))),
            &Calendar::default(),
        );
        let granularity = data.granularity_mut(GranularityType::Month);
        let selection =
            separate_selection(granularity, date(2016, 8, 15), date(2016, 8, 16)).unwrap();
        let [start, end] = selection.cursor_positions(31.0);
        assert!((start - (7.0 * 31.0 + 14.0)).abs() < 1e-9);
        assert!((end - (7.0 * 31.0 + 15.0)).abs() < 1e-9);

        // A position inside the split fragment finds it
        let elements = period_indices(granularity.periods());
        assert_eq!(get_index_by_position(&elements, 31.0, 7.0 * 31.0 + 14.5, 0.0), Some(8));
    }
}
