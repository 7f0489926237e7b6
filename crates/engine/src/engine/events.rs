// SPDX-License-Identifier: MIT

//!
//! Events
//!

use crate::CursorIndex;
use chrono::NaiveDate;
use serde::Serialize;
use timeslicer_core::GranularityType;

/// Interaction events
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TimelineInteractionEvent {
    /// The selected dates changed (`end` is exclusive)
    SelectionChanged { start: NaiveDate, end: NaiveDate },

    /// The selection was cleared
    SelectionCleared,

    GranularityChanged(GranularityType),
    DragStarted(CursorIndex),
    DragEnded(CursorIndex),
}
