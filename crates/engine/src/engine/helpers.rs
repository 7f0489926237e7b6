// SPDX-License-Identifier: MIT

//!
//! Helper functions
//!

/// Fractions closer than this are considered equal.  Splitting a period into
/// fragments and merging them back doesn't always sum to exactly 1.0.
pub(crate) const FRACTION_EPSILON: f64 = 1e-9;

/// Whether the fraction is a whole period (allowing for float error)
pub(crate) fn is_whole_fraction(fraction: f64) -> bool {
    fraction >= 1.0 - FRACTION_EPSILON
}

/// Whether the ratio lies strictly inside a period, i.e. whether splitting at
/// it would leave two non-empty fragments
pub(crate) fn is_partial_ratio(ratio: f64) -> bool {
    ratio > FRACTION_EPSILON && ratio < 1.0 - FRACTION_EPSILON
}

/// Snap a fraction that's within float error of a whole period to exactly 1.0
pub(crate) fn snap_fraction(fraction: f64) -> f64 {
    if (fraction - 1.0).abs() < FRACTION_EPSILON {
        1.0
    } else {
        fraction
    }
}
