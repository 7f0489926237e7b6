// SPDX-License-Identifier: MIT

//!
//! *Part of the wider TimeSlicer project*
//!
//! This crate is the platform independent engine behind a timeline slicer.
//! It is responsible for:
//!
//! - Bucketing the observed dates into year, quarter, month, week and day
//!   periods according to a fiscal calendar
//! - Labelling the periods at every coarser granularity
//! - Managing the selected date range, splitting periods where the range
//!   starts or ends part way through one
//! - Handling cursor drags & clicks and emitting events
//!
//! Rendering is left to the host, which is given the periods, the label rows
//! and the cursor positions.
//!

pub mod engine;

pub use engine::*;
