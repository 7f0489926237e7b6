// SPDX-License-Identifier: MIT

//!
//! The granularity selector
//!

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors that can arise in relation to a [`GranularityType`]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GranularityTypeError {
    /// The persisted value must be 0 <= value <= 4
    #[error("Granularity `{0}` is not allowed")]
    InvalidValue(i64),
}

/// How dates are bucketed, from coarsest to finest.
///
/// The discriminant is the form persisted by the host (e.g. `Month` is `2`).
#[rustfmt::skip]
#[derive(derive_more::Display, Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GranularityType {
    Year = 0,
    Quarter = 1,
    #[default]
    Month = 2,
    Week = 3,
    Day = 4,
}

impl GranularityType {
    /// Every granularity, coarsest first
    pub const ALL: [GranularityType; 5] = [
        GranularityType::Year,
        GranularityType::Quarter,
        GranularityType::Month,
        GranularityType::Week,
        GranularityType::Day,
    ];

    /// The persisted integer value
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Position in [`GranularityType::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Whether this granularity is at least as fine as the other (e.g. `Day`
    /// is at least as fine as `Month`)
    pub fn is_at_least_as_fine_as(&self, other: GranularityType) -> bool {
        self >= &other
    }
}

impl TryFrom<i64> for GranularityType {
    type Error = GranularityTypeError;
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Year),
            1 => Ok(Self::Quarter),
            2 => Ok(Self::Month),
            3 => Ok(Self::Week),
            4 => Ok(Self::Day),
            _ => Err(GranularityTypeError::InvalidValue(value)),
        }
    }
}

impl Serialize for GranularityType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.value())
    }
}

impl<'de> Deserialize<'de> for GranularityType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        GranularityType::try_from(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn try_from() {
        assert_eq!(GranularityType::try_from(0), Ok(GranularityType::Year));
        assert_eq!(GranularityType::try_from(4), Ok(GranularityType::Day));
        assert_eq!(
            GranularityType::try_from(5),
            Err(GranularityTypeError::InvalidValue(5))
        );
        assert!(GranularityType::try_from(-1).is_err());
    }

    #[test]
    fn persisted_form() {
        assert_eq!(serde_json::to_string(&GranularityType::Week).unwrap(), "3");
        let granularity: GranularityType = serde_json::from_str("1").unwrap();
        assert_eq!(granularity, GranularityType::Quarter);
        assert!(serde_json::from_str::<GranularityType>("9").is_err());
    }

    #[test]
    fn ordering() {
        assert!(GranularityType::Day.is_at_least_as_fine_as(GranularityType::Month));
        assert!(GranularityType::Month.is_at_least_as_fine_as(GranularityType::Month));
        assert!(!GranularityType::Year.is_at_least_as_fine_as(GranularityType::Quarter));
        assert_eq!(GranularityType::ALL[GranularityType::Week.index()], GranularityType::Week);
        assert_eq!(GranularityType::Quarter.to_string(), "Quarter");
    }
}
