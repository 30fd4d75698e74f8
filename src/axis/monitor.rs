//! Limit-sense monitoring.
//!
//! Each poll cycle re-reads the hardware limit inputs into latched flags.
//! The flags combine with the driver fault bit and the software travel
//! limits into the forward/reverse motion-error predicates on
//! [`crate::Axis`].

use crate::hal::{LimitSense, SenseHandle};

/// Latched limit-sense flags, refreshed once per poll cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct LimitFlags {
    /// The minimum-travel limit input reads active.
    pub min_limit_sensed: bool,
    /// The maximum-travel limit input reads active.
    pub max_limit_sensed: bool,
}

impl LimitFlags {
    /// Re-read both sense inputs.
    pub fn refresh<S: LimitSense>(
        &mut self,
        sense: &mut S,
        min_input: SenseHandle,
        max_input: SenseHandle,
    ) {
        self.min_limit_sensed = sense.read(min_input);
        self.max_limit_sensed = sense.read(max_input);
    }
}
