// SPDX-License-Identifier: MIT

//!
//! *Part of the wider TimeSlicer project*
//!
//! This crate defines the basic datatypes used across the TimeSlicer project
//! (engine, command line tool).
//!
//! It holds everything that is independent of how dates are bucketed and
//! selected:
//!
//! - Coercing raw host values into dates, and finding the observed extent
//! - The fiscal [`Calendar`] (start of year, start of week, quarter starts)
//! - The [`GranularityType`] selector and its persisted integer form
//! - The [`TimelineSettings`] loaded from the host
//!

mod calendar;
mod date;
mod granularity_type;
mod settings;

pub use calendar::*;
pub use date::*;
pub use granularity_type::*;
pub use settings::*;
