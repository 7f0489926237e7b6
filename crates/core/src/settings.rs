// SPDX-License-Identifier: MIT

//!
//! TimeSlicer settings (as supplied by the host)
//!

use crate::GranularityType;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can arise when loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Unable to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// All settings that affect the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// The start of the fiscal year
    pub calendar: CalendarSettings,

    /// The start of the week
    pub week_day: WeekDaySettings,

    /// The granularity shown
    pub granularity: GranularityType,

    /// Whether a selection is forced after the dates change
    pub force_selection: ForceSelectionSettings,
}

/// The start of the fiscal year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// 1 (January) to 12 (December)
    pub month: u8,

    /// 1 to 31
    pub day: u8,
}

/// The start of the week
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekDaySettings {
    /// 0 (Sunday) to 6 (Saturday)
    pub day: u8,
}

/// Forced selections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceSelectionSettings {
    /// Select the period containing today
    pub current_period: bool,

    /// Select the period containing the latest date
    pub latest_available_date: bool,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self { month: 1, day: 1 }
    }
}

impl CalendarSettings {
    /// Clamp the month & day into range
    pub fn sanitised(&self) -> Self {
        let sanitised = Self {
            month: self.month.clamp(1, 12),
            day: self.day.clamp(1, 31),
        };
        if sanitised != *self {
            warn!("calendar settings {self:?} clamped to {sanitised:?}");
        }
        sanitised
    }
}

impl WeekDaySettings {
    /// Clamp the day into range
    pub fn sanitised(&self) -> Self {
        let sanitised = Self {
            day: self.day.min(6),
        };
        if sanitised != *self {
            warn!("week day settings {self:?} clamped to {sanitised:?}");
        }
        sanitised
    }
}

impl TimelineSettings {
    /// Load the settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        info!("Loading settings from {}", path.display());
        let data = fs::read_to_string(path)?;
        let settings = Self::from_json(&data)?;
        info!("Settings loaded = {settings:?}");
        Ok(settings)
    }

    /// Parse the settings from JSON.  Missing fields take their defaults, and
    /// out of range values are clamped.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: TimelineSettings = serde_json::from_str(json)?;
        Ok(settings.sanitised())
    }

    /// Clamp every value into range
    pub fn sanitised(&self) -> Self {
        Self {
            calendar: self.calendar.sanitised(),
            week_day: self.week_day.sanitised(),
            granularity: self.granularity,
            force_selection: self.force_selection,
        }
    }
}
