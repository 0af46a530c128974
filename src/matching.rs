//! Match Scorer
//!
//! Scores how well one local value fits one crop requirement, on [0, 1].
//!
//! - Numeric criteria (ph, rain, temp): 1.0 inside the crop's [min, max]
//!   range, linear decay over a tolerance band of half the range width,
//!   0.0 beyond it.
//! - Level criteria (sun, irrigation): the crop's Low/Medium/High label is
//!   mapped to a midpoint and scored as the numeric range midpoint ± 0.2.
//! - Soil: case-insensitive substring match in either direction, no partial
//!   credit.

use serde::Serialize;

/// Tolerance band as a fraction of the range width
pub const TOLERANCE_FRACTION: f64 = 0.5;

/// Half-width of the range built around a Low/Medium/High midpoint
pub const LEVEL_HALF_WIDTH: f64 = 0.2;

/// Midpoint used when a level label is not recognized
pub const DEFAULT_LEVEL_MIDPOINT: f64 = 0.6;

/// Where a local value sits relative to a crop's required range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeFit {
    BelowRange,
    WithinRange,
    AboveRange,
}

/// Range comparison with the distance information the score is derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeComparison {
    pub fit: RangeFit,

    /// Distance to the nearest boundary (0 if within range)
    pub distance: f64,

    /// Width of the decay band; a zero-width range counts as width 1
    pub tolerance: f64,
}

impl RangeComparison {
    /// Linear decay score derived from the comparison
    pub fn score(&self) -> f64 {
        match self.fit {
            RangeFit::WithinRange => 1.0,
            _ if self.distance > self.tolerance => 0.0,
            _ => 1.0 - self.distance / self.tolerance,
        }
    }
}

/// Compare a local value against a crop's [min, max] requirement
pub fn compare_to_range(value: f64, min: f64, max: f64) -> RangeComparison {
    let mut range_width = max - min;
    if range_width == 0.0 {
        range_width = 1.0;
    }
    let tolerance = range_width * TOLERANCE_FRACTION;

    let (fit, distance) = if min <= value && value <= max {
        (RangeFit::WithinRange, 0.0)
    } else {
        let distance = (value - min).abs().min((value - max).abs());
        if value < min {
            (RangeFit::BelowRange, distance)
        } else {
            (RangeFit::AboveRange, distance)
        }
    };

    RangeComparison {
        fit,
        distance,
        tolerance,
    }
}

/// Numeric match score for ph, rain and temp
pub fn numeric_match(value: f64, min: f64, max: f64) -> f64 {
    compare_to_range(value, min, max).score()
}

/// Soil match: 1.0 when either string contains the other (case-insensitive)
pub fn categorical_match(value: &str, required: &str) -> f64 {
    let value = value.to_lowercase();
    let required = required.to_lowercase();
    if required.contains(&value) || value.contains(&required) {
        1.0
    } else {
        0.0
    }
}

/// Representative midpoint for a Low/Medium/High requirement label
pub fn level_midpoint(label: &str) -> f64 {
    match label.trim().to_ascii_lowercase().as_str() {
        "low" => 0.3,
        "medium" => 0.6,
        "high" => 1.0,
        _ => DEFAULT_LEVEL_MIDPOINT,
    }
}

/// Sun/irrigation match: numeric rule over midpoint ± 0.2
pub fn level_match(value: f64, label: &str) -> f64 {
    let midpoint = level_midpoint(label);
    numeric_match(value, midpoint - LEVEL_HALF_WIDTH, midpoint + LEVEL_HALF_WIDTH)
}
