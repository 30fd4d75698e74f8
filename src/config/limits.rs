//! Travel limit configuration.

use serde::Deserialize;

use super::units::Measures;

/// Software travel limits in measures (from configuration).
///
/// Checked against the instrument coordinate each poll cycle when limit
/// checking is enabled; a breach vetoes further motion in that direction.
#[derive(Debug, Clone, Deserialize)]
pub struct TravelLimits {
    /// Minimum allowed instrument position in measures.
    #[serde(rename = "min_measures")]
    pub min: Measures,

    /// Maximum allowed instrument position in measures.
    #[serde(rename = "max_measures")]
    pub max: Measures,
}

impl TravelLimits {
    /// Create new travel limits.
    pub fn new(min: Measures, max: Measures) -> Self {
        Self { min, max }
    }

    /// Check if limits are valid (min < max).
    pub fn is_valid(&self) -> bool {
        self.min.0 < self.max.0
    }

    /// True when a position is past the maximum limit.
    #[inline]
    pub fn past_max(&self, position: Measures) -> bool {
        position.0 > self.max.0
    }

    /// True when a position is past the minimum limit.
    #[inline]
    pub fn past_min(&self, position: Measures) -> bool {
        position.0 < self.min.0
    }

    /// Check if a position is within limits.
    pub fn contains(&self, position: Measures) -> bool {
        !self.past_min(position) && !self.past_max(position)
    }
}
