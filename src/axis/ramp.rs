//! Acceleration ramp state machine.
//!
//! The ramp shapes the commanded rate one poll cycle at a time: time-based
//! slews add a fixed per-cycle increment until clamped at the maximum,
//! distance-based slews recompute the rate from the remaining travel, and
//! the end/abort states walk the rate back to exactly zero.

use libm::fabsf;

/// Direction of a time-based slew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Positive rates, toward increasing coordinates.
    Forward,
    /// Negative rates, toward decreasing coordinates.
    Reverse,
}

/// Acceleration ramp mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoRate {
    /// No ramp active; the rate is zero.
    #[default]
    None,
    /// Rate shaped by the remaining distance to origin or target.
    ByDistance,
    /// Ramp up toward +max at the slew acceleration.
    ByTimeForward,
    /// Ramp up toward -max at the slew acceleration.
    ByTimeReverse,
    /// Decelerate to zero at the slew acceleration to end a slew.
    ByTimeEnd,
    /// Decelerate to zero at the abort acceleration. Takes precedence and
    /// cannot itself be stopped.
    ByTimeAbort,
}

/// Per-cycle ramp parameters, derived from the axis configuration.
#[derive(Debug, Clone, Copy)]
pub struct RampParams {
    /// Maximum slew rate in measures/s.
    pub max_freq: f32,
    /// Backlash take-up rate in measures/s, the floor of distance ramps.
    pub backlash_freq: f32,
    /// Slew rate change per poll cycle, in measures/s.
    pub slew_increment: f32,
    /// Abort rate change per poll cycle, in measures/s.
    pub abort_increment: f32,
    /// Distance over which a distance-based ramp reaches max rate.
    pub accel_distance: f32,
}

/// Per-cycle ramp inputs, read from the coordinate store.
#[derive(Debug, Clone, Copy)]
pub struct RampInput {
    /// Distance to the nearer of origin or target, in measures.
    pub origin_or_target_distance: f32,
    /// Whether the remaining travel to the target is in reverse.
    pub reverse: bool,
}

/// The acceleration ramp: current mode plus the ramped rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ramp {
    state: AutoRate,
    freq: f32,
}

impl Ramp {
    /// Create an idle ramp.
    pub const fn new() -> Self {
        Self {
            state: AutoRate::None,
            freq: 0.0,
        }
    }

    /// Current ramp mode.
    #[inline]
    pub fn state(&self) -> AutoRate {
        self.state
    }

    /// Current ramped rate in measures/s (signed).
    #[inline]
    pub fn frequency(&self) -> f32 {
        self.freq
    }

    /// Whether any ramp mode is active.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state != AutoRate::None
    }

    /// Start a distance-shaped slew. Returns true when the ramp was idle
    /// (the caller switches the driver decay mode on that edge).
    pub fn start_by_distance(&mut self) -> bool {
        let was_idle = self.state == AutoRate::None;
        self.state = AutoRate::ByDistance;
        was_idle
    }

    /// Start (or re-aim) a time-based slew. Returns true when the ramp was
    /// idle. A call while a ramp is already active only flips direction.
    pub fn start_by_time(&mut self, direction: Direction) -> bool {
        let was_idle = self.state == AutoRate::None;
        self.state = match direction {
            Direction::Forward => AutoRate::ByTimeForward,
            Direction::Reverse => AutoRate::ByTimeReverse,
        };
        was_idle
    }

    /// Begin a graceful stop. No effect while idle or already aborting.
    /// Returns true when the stop ramp was entered.
    pub fn stop(&mut self) -> bool {
        if self.state != AutoRate::None && self.state != AutoRate::ByTimeAbort {
            self.state = AutoRate::ByTimeEnd;
            true
        } else {
            false
        }
    }

    /// Drop straight back to idle without decelerating. The rate zeroes on
    /// the next advance; used when a distance-based slew is cut short.
    pub fn cancel(&mut self) {
        self.state = AutoRate::None;
    }

    /// Begin an emergency abort. No effect while idle. Returns true when
    /// the abort ramp was entered.
    pub fn abort(&mut self) -> bool {
        if self.state != AutoRate::None {
            self.state = AutoRate::ByTimeAbort;
            true
        } else {
            false
        }
    }

    /// Advance the ramp by one poll cycle.
    ///
    /// Returns true on the cycle where an end/abort ramp reaches zero and
    /// the state snaps back to [`AutoRate::None`].
    pub fn advance(&mut self, input: &RampInput, params: &RampParams) -> bool {
        match self.state {
            AutoRate::None => {
                self.freq = 0.0;
                false
            }
            AutoRate::ByDistance => {
                let mut freq = (input.origin_or_target_distance / params.accel_distance)
                    * params.max_freq
                    + params.backlash_freq;
                if freq < params.backlash_freq {
                    freq = params.backlash_freq;
                }
                if freq > params.max_freq {
                    freq = params.max_freq;
                }
                if input.reverse {
                    freq = -freq;
                }
                self.freq = freq;
                false
            }
            AutoRate::ByTimeForward => {
                self.freq += params.slew_increment;
                if self.freq > params.max_freq {
                    self.freq = params.max_freq;
                }
                false
            }
            AutoRate::ByTimeReverse => {
                self.freq -= params.slew_increment;
                if self.freq < -params.max_freq {
                    self.freq = -params.max_freq;
                }
                false
            }
            AutoRate::ByTimeEnd => self.ramp_down(params.slew_increment),
            AutoRate::ByTimeAbort => self.ramp_down(params.abort_increment),
        }
    }

    fn ramp_down(&mut self, increment: f32) -> bool {
        if self.freq > increment {
            self.freq -= increment;
        } else if self.freq < -increment {
            self.freq += increment;
        } else {
            self.freq = 0.0;
        }

        // within one increment of zero: snap and finish
        if fabsf(self.freq) <= increment {
            self.state = AutoRate::None;
            self.freq = 0.0;
            true
        } else {
            false
        }
    }
}
