//! The per-axis motion controller.
//!
//! [`Axis`] ties the shared step counters, the acceleration ramp, the
//! microstep mode protocol and the fault monitor together under a single
//! [`Axis::poll`] entry point, called at a fixed cadence by the external
//! scheduler. Each cycle it latches the limit inputs, advances the ramp by
//! one increment, negotiates the driver's microstep mode, folds in backlash
//! take-up, and programs the next pulse period.

mod coords;
mod mode;
mod monitor;
mod ramp;

pub use coords::CoordStore;
pub use mode::{MicrostepModeControl, MODE_SWITCH_HYSTERESIS};
pub use monitor::LimitFlags;
pub use ramp::{AutoRate, Direction, Ramp, RampInput, RampParams};

use embedded_hal::digital::OutputPin;
use libm::fabsf;

use crate::config::units::{Measures, MeasuresPerSec, MeasuresPerSecSquared, StepWaveform, Steps};
use crate::config::{validate_axis, AxisConfig, TravelLimits};
use crate::error::{AxisError, Result};
use crate::hal::{LimitSense, PulseScheduler, SenseHandle, StepDriver, TaskHandle};
use crate::msg;

/// Poll cadence the external scheduler is expected to run, in Hz.
/// Acceleration rates are converted to per-cycle increments against this.
pub const POLL_HZ: f32 = 100.0;

/// Sub-microsecond timer counts per microsecond.
const SUB_MICROS_PER_MICRO: f32 = 16.0;

/// Largest pulse period the hardware can represent, in microseconds.
const MAX_PERIOD_MICROS: f32 = 134_000_000.0;

/// Nominal sub-microsecond counts per timing reference period; the ratio
/// against the observed value corrects for host clock inaccuracy.
const SIDEREAL_PERIOD_SUB_MICROS: f32 = 15_956_313.0;

/// Single-axis motion controller.
///
/// Generic over its hardware collaborators:
/// - `D`: the stepper driver (mode control and fault reporting)
/// - `S`: the digital sense inputs (limit switches)
/// - `P`: the periodic-task scheduler firing the pulse interrupt
/// - `EN`: the enable output pin (must implement `OutputPin`)
///
/// One instance is constructed per physical axis at startup and lives for
/// the life of the process. The pulse interrupt shares only the
/// [`CoordStore`] handed out by [`Axis::coords`].
pub struct Axis<D, S, P, EN>
where
    D: StepDriver,
    S: LimitSense,
    P: PulseScheduler,
    EN: OutputPin,
{
    driver: D,
    sense: S,
    scheduler: P,
    enable_pin: Option<EN>,

    task: TaskHandle,
    min_sense: SenseHandle,
    max_sense: SenseHandle,

    /// Step counters shared with the pulse interrupt.
    coords: CoordStore,

    name: heapless::String<32>,
    steps_per_measure: f64,
    invert_enable: bool,
    waveform: StepWaveform,
    limits: Option<TravelLimits>,

    /// Constant tracking-rate bias in measures/s.
    base_freq: f32,
    /// Maximum slew rate in measures/s.
    max_freq: f32,
    /// Backlash take-up rate in measures/s.
    backlash_freq: f32,
    /// Pulse period floor derived from `max_freq`, in microseconds.
    min_period_micros: f32,
    /// Slew rate change per poll cycle, in measures/s.
    slew_increment: f32,
    /// Abort rate change per poll cycle, in measures/s.
    abort_increment: f32,
    /// Distance over which a distance-based ramp reaches max rate.
    accel_distance: f32,

    ramp: Ramp,
    mode: MicrostepModeControl,
    flags: LimitFlags,

    /// Microstep multiplier reported by the driver for slewing mode.
    slew_step: i64,
    /// Last commanded rate magnitude in measures/s.
    last_freq: f32,
    /// Last period handed to hardware, before clock correction.
    last_period_set: u32,
    /// Last period handed to hardware, after clock correction.
    last_period: u32,
    /// Observed sub-micro counts per timing reference period.
    observed_period_sub_micros: f32,

    /// Last commanded target in measures.
    target: f64,
    tracking: bool,
    enabled: bool,
    limits_check: bool,
}

impl<D, S, P, EN> Axis<D, S, P, EN>
where
    D: StepDriver,
    S: LimitSense,
    P: PulseScheduler,
    EN: OutputPin,
{
    /// Create an axis from a validated configuration and its hardware
    /// collaborators.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the config fails validation.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &AxisConfig,
        driver: D,
        sense: S,
        scheduler: P,
        task: TaskHandle,
        min_sense: SenseHandle,
        max_sense: SenseHandle,
        enable_pin: Option<EN>,
    ) -> Result<Self> {
        validate_axis(config.name.as_str(), config)?;

        let coords = CoordStore::new();
        coords.set_backlash_amount(libm::round(config.backlash.0 * config.steps_per_measure) as i64);

        let min_period_micros = 1_000_000.0
            / ((config.max_freq.0 + config.base_freq.0) * config.steps_per_measure as f32);

        Ok(Self {
            driver,
            sense,
            scheduler,
            enable_pin,
            task,
            min_sense,
            max_sense,
            coords,
            name: config.name.clone(),
            steps_per_measure: config.steps_per_measure,
            invert_enable: config.invert_enable,
            waveform: config.waveform,
            limits: config.limits.clone(),
            base_freq: config.base_freq.0,
            max_freq: config.max_freq.0,
            backlash_freq: config.backlash_freq.0,
            min_period_micros,
            slew_increment: config.slew_accel.0 / POLL_HZ,
            abort_increment: config.abort_accel.0 / POLL_HZ,
            accel_distance: 1.0,
            ramp: Ramp::new(),
            mode: MicrostepModeControl::Tracking,
            flags: LimitFlags::default(),
            slew_step: 1,
            last_freq: 0.0,
            last_period_set: 0,
            last_period: 0,
            observed_period_sub_micros: SIDEREAL_PERIOD_SUB_MICROS,
            target: 0.0,
            tracking: false,
            enabled: false,
            limits_check: config.limits_check,
        })
    }

    /// Get the axis name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Energize or de-energize the motor driver via the enable output.
    pub fn enable(&mut self, value: bool) -> Result<()> {
        if let Some(pin) = self.enable_pin.as_mut() {
            // enable is asserted low unless the polarity is inverted
            let high = value == self.invert_enable;
            let result = if high { pin.set_high() } else { pin.set_low() };
            result.map_err(|_| AxisError::EnablePin)?;
        }
        self.enabled = value;
        Ok(())
    }

    /// Whether the motor driver is energized.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Steps per physical unit of axis travel.
    #[inline]
    pub fn steps_per_measure(&self) -> f64 {
        self.steps_per_measure
    }

    /// Microstep multiplier in effect while slewing.
    #[inline]
    pub fn steps_per_step_slewing(&self) -> i64 {
        self.slew_step
    }

    /// Shared counter store, for registration with the pulse generator.
    #[inline]
    pub fn coords(&self) -> &CoordStore {
        &self.coords
    }

    /// Borrow the stepper driver.
    #[inline]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutably borrow the stepper driver.
    #[inline]
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    // ------------------------------------------------------------------
    // Coordinates

    /// Hard position reset in measures: rebases target, index and backlash
    /// onto the new motor position. This is not a move.
    pub fn set_motor_coordinate(&mut self, value: Measures) {
        self.set_motor_coordinate_steps(Steps::from_measures(value, self.steps_per_measure).0);
    }

    /// Motor position in measures, including any un-taken backlash.
    pub fn motor_coordinate(&self) -> Measures {
        Steps(self.coords.motor_steps()).to_measures(self.steps_per_measure)
    }

    /// Hard position reset in steps.
    pub fn set_motor_coordinate_steps(&mut self, value: i64) {
        self.coords.set_motor_steps(value);
        self.target = Steps(value).to_measures(self.steps_per_measure).0;
    }

    /// Motor position in steps, including any un-taken backlash.
    pub fn motor_coordinate_steps(&self) -> i64 {
        self.coords.motor_steps()
    }

    /// Relabel the instrument position without moving the motor.
    pub fn set_instrument_coordinate(&mut self, value: Measures) {
        self.coords
            .set_instrument_steps(Steps::from_measures(value, self.steps_per_measure).0);
    }

    /// Instrument position in measures.
    pub fn instrument_coordinate(&self) -> Measures {
        Steps(self.coords.instrument_steps()).to_measures(self.steps_per_measure)
    }

    /// Instrument position in steps.
    pub fn instrument_coordinate_steps(&self) -> i64 {
        self.coords.instrument_steps()
    }

    /// Set the destination in measures.
    pub fn set_target_coordinate(&mut self, value: Measures) {
        self.target = value.0;
        self.coords
            .set_target_steps(Steps::from_measures(value, self.steps_per_measure).0);
    }

    /// Set the destination in instrument-frame steps.
    pub fn set_target_coordinate_steps(&mut self, value: i64) {
        self.target = Steps(value).to_measures(self.steps_per_measure).0;
        self.coords.set_target_steps(value);
    }

    /// Destination in measures.
    pub fn target_coordinate(&self) -> Measures {
        Steps(self.coords.target_steps()).to_measures(self.steps_per_measure)
    }

    /// Destination in instrument-frame steps.
    pub fn target_coordinate_steps(&self) -> i64 {
        self.coords.target_steps()
    }

    /// Shift the destination by a relative amount in measures.
    pub fn increment_target_coordinate(&mut self, delta: Measures) {
        let target = Measures(self.target + delta.0);
        self.set_target_coordinate(target);
    }

    /// Snapshot the motor position as the origin of a distance-based slew.
    pub fn mark_origin_coordinate(&mut self) {
        self.coords.mark_origin();
    }

    /// True when the motor is within twice the current step granularity of
    /// the target.
    pub fn near_target(&self) -> bool {
        self.coords.near_target()
    }

    /// Distance to the nearer of the slew origin or the target, in
    /// measures.
    pub fn origin_or_target_distance(&self) -> Measures {
        Steps(self.coords.origin_or_target_distance_steps()).to_measures(self.steps_per_measure)
    }

    // ------------------------------------------------------------------
    // Rates

    /// Set the constant tracking-rate bias.
    pub fn set_frequency_base(&mut self, frequency: MeasuresPerSec) {
        self.base_freq = frequency.0;
    }

    /// Set the maximum slew rate and recompute the pulse period floor.
    pub fn set_frequency_max(&mut self, frequency: MeasuresPerSec) {
        self.max_freq = frequency.0;
        if frequency.0 != 0.0 {
            self.min_period_micros = 1_000_000.0
                / ((self.max_freq + self.base_freq) * self.steps_per_measure as f32);
        } else {
            self.min_period_micros = 0.0;
        }
    }

    /// Set the slew acceleration, converted to a per-poll-cycle increment.
    pub fn set_slew_acceleration_rate(&mut self, rate: MeasuresPerSecSquared) {
        self.slew_increment = rate.0 / POLL_HZ;
    }

    /// Set the abort deceleration, converted to a per-poll-cycle increment.
    pub fn set_slew_acceleration_rate_abort(&mut self, rate: MeasuresPerSecSquared) {
        self.abort_increment = rate.0 / POLL_HZ;
    }

    /// Whether the base tracking rate is being added to the ramped rate.
    #[inline]
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Turn the base tracking rate on or off.
    pub fn set_tracking(&mut self, state: bool) {
        self.tracking = state;
    }

    /// Update the observed sub-microsecond counts per timing reference
    /// period, as measured against the host clock. Non-positive values are
    /// ignored.
    pub fn set_observed_period_sub_micros(&mut self, value: f32) {
        if value > 0.0 {
            self.observed_period_sub_micros = value;
        }
    }

    // ------------------------------------------------------------------
    // Backlash

    /// Configure the backlash window in measures.
    pub fn set_backlash(&mut self, value: Measures) {
        self.coords
            .set_backlash_amount(libm::round(value.0 * self.steps_per_measure) as i64);
    }

    /// Current backlash deficit in measures.
    pub fn backlash(&self) -> Measures {
        Steps(self.coords.backlash_steps()).to_measures(self.steps_per_measure)
    }

    /// True while strictly inside the backlash window.
    pub fn in_backlash(&self) -> bool {
        self.coords.in_backlash()
    }

    /// Suspend backlash compensation, folding the deficit into the motor
    /// counter so the reported position is unchanged.
    pub fn disable_backlash(&mut self) {
        self.coords.disable_backlash();
    }

    /// Restore backlash compensation. Exact inverse of
    /// [`Axis::disable_backlash`].
    pub fn enable_backlash(&mut self) {
        self.coords.enable_backlash();
    }

    // ------------------------------------------------------------------
    // Slews

    /// Start a slew whose rate is shaped by the remaining distance to the
    /// target, reaching max rate over `distance` measures. Snapshots the
    /// origin. Non-positive distances are ignored.
    pub fn auto_slew_rate_by_distance(&mut self, distance: Measures) {
        if distance.0 <= 0.0 {
            return;
        }
        self.accel_distance = distance.0 as f32;
        self.coords.mark_origin();
        self.ramp.start_by_distance();
        self.driver.mode_decay_slewing();
        msg!("axis: distance slew started");
    }

    /// End a distance-based slew without decelerating.
    pub fn auto_slew_rate_by_distance_stop(&mut self) {
        self.driver.mode_decay_tracking();
        self.ramp.cancel();
    }

    /// Start (or re-aim) a direction-held slew ramping toward the maximum
    /// rate at the slew acceleration.
    pub fn auto_slew(&mut self, direction: Direction) {
        if self.ramp.start_by_time(direction) {
            self.driver.mode_decay_slewing();
            msg!("axis: slew started");
        }
    }

    /// Decelerate the active slew gracefully to zero. No effect while idle
    /// or already aborting.
    pub fn auto_slew_stop(&mut self) {
        if self.ramp.stop() {
            msg!("axis: slew stopping");
            self.poll();
        }
    }

    /// Decelerate to zero at the abort rate, unconditionally.
    pub fn auto_slew_abort(&mut self) {
        if self.ramp.abort() {
            msg!("axis: slew aborting");
            self.poll();
        }
    }

    /// Whether any slew ramp is active.
    pub fn auto_slew_active(&self) -> bool {
        self.ramp.is_active()
    }

    /// Current acceleration ramp mode.
    #[inline]
    pub fn auto_rate(&self) -> AutoRate {
        self.ramp.state()
    }

    /// Current ramped rate in measures/s (signed, without the base bias).
    #[inline]
    pub fn ramp_frequency(&self) -> f32 {
        self.ramp.frequency()
    }

    /// Current microstep mode negotiation state.
    #[inline]
    pub fn microstep_mode(&self) -> MicrostepModeControl {
        self.mode
    }

    // ------------------------------------------------------------------
    // Faults and limits

    /// Enable or disable software travel-limit checking.
    pub fn set_motion_limits_check(&mut self, state: bool) {
        self.limits_check = state;
    }

    /// Latched limit-sense flags from the last poll cycle.
    #[inline]
    pub fn limit_flags(&self) -> LimitFlags {
        self.flags
    }

    /// True when forward motion is vetoed: driver fault, software max
    /// limit crossed, or the max limit input sensed.
    pub fn motion_forward_error(&self) -> bool {
        self.driver.status().fault
            || (self.limits_check
                && self
                    .limits
                    .as_ref()
                    .is_some_and(|l| l.past_max(self.instrument_coordinate())))
            || self.flags.max_limit_sensed
    }

    /// True when reverse motion is vetoed: driver fault, software min
    /// limit crossed, or the min limit input sensed.
    pub fn motion_reverse_error(&self) -> bool {
        self.driver.status().fault
            || (self.limits_check
                && self
                    .limits
                    .as_ref()
                    .is_some_and(|l| l.past_min(self.instrument_coordinate())))
            || self.flags.min_limit_sensed
    }

    /// True when motion is vetoed in either direction.
    pub fn motion_error(&self) -> bool {
        self.motion_forward_error() || self.motion_reverse_error()
    }

    // ------------------------------------------------------------------
    // Poll loop

    /// Advance the controller by one cycle. Called by the external
    /// scheduler at [`POLL_HZ`]; returns promptly and never blocks.
    pub fn poll(&mut self) {
        self.flags
            .refresh(&mut self.sense, self.min_sense, self.max_sense);

        // the sole automatic safety interlock: abort the slew and stop
        // tracking when a motion error appears in the direction of travel
        if self.ramp.state() != AutoRate::ByTimeAbort && self.last_period != 0 {
            let direction = self.coords.direction();
            if direction < 0 && self.motion_reverse_error() {
                msg!("axis: motion reverse error");
                self.auto_slew_abort();
                if self.tracking {
                    self.tracking = false;
                    msg!("axis: tracking stopped");
                }
                return;
            }
            if direction > 0 && self.motion_forward_error() {
                msg!("axis: motion forward error");
                self.auto_slew_abort();
                if self.tracking {
                    self.tracking = false;
                    msg!("axis: tracking stopped");
                }
                return;
            }
        }

        // acceleration
        let input = RampInput {
            origin_or_target_distance: self.origin_or_target_distance().0 as f32,
            reverse: self.coords.target_direction() < 0,
        };
        let params = RampParams {
            max_freq: self.max_freq,
            backlash_freq: self.backlash_freq,
            slew_increment: self.slew_increment,
            abort_increment: self.abort_increment,
            accel_distance: self.accel_distance,
        };
        if self.ramp.advance(&input, &params) {
            self.driver.mode_decay_tracking();
            msg!("axis: slew stopped");
        }

        // microstep mode switching
        let hysteresis = self.backlash_freq * MODE_SWITCH_HYSTERESIS;
        let rate = fabsf(self.ramp.frequency());

        if self.mode.is_slewing() {
            if (rate <= hysteresis || !self.ramp.is_active()) && self.driver.mode_switch_allowed()
            {
                self.driver.mode_microstep_tracking();
                self.mode = MicrostepModeControl::Tracking;
                self.coords.set_step_size(1);
                msg!("axis: mode switch tracking set");
            }
        } else if self.ramp.is_active() && rate > hysteresis {
            match self.mode {
                MicrostepModeControl::Tracking => {
                    self.mode = MicrostepModeControl::SlewingRequest;
                    msg!("axis: mode switch slewing requested");
                    return;
                }
                MicrostepModeControl::SlewingRequest => {
                    if self.driver.mode_switch_allowed() {
                        self.mode = MicrostepModeControl::SlewingReady;
                    }
                    return;
                }
                MicrostepModeControl::SlewingReady => {
                    if !self.driver.mode_switch_allowed() {
                        return;
                    }
                    self.slew_step = i64::from(self.driver.mode_microstep_slewing());
                    self.mode = MicrostepModeControl::Slewing;
                    self.coords.set_step_size(self.slew_step);
                    msg!("axis: mode switch slewing set");
                }
                MicrostepModeControl::Slewing => {}
            }
        } else if self.mode.is_switch_pending() {
            // rate fell back below the threshold before the switch committed
            self.mode = MicrostepModeControl::Tracking;
        }

        // apply the composite or backlash rate as required
        let mut applied = self.ramp.frequency();
        if self.tracking {
            applied += self.base_freq;
        }
        if self.mode.is_slewing() {
            self.set_frequency_raw(applied / self.slew_step as f32);
        } else {
            if self.coords.in_backlash() {
                applied = if applied >= 0.0 {
                    self.backlash_freq
                } else {
                    -self.backlash_freq
                };
            }
            self.set_frequency_raw(applied);
        }

        // refresh the driver status
        self.driver.update_status();
    }

    // ------------------------------------------------------------------
    // Frequency/period engine

    /// Command a step rate in measures/s; the sign encodes direction. The
    /// resulting pulse period is clock-corrected and programmed on the
    /// scheduler, or pulsing stops if the period is not representable.
    pub fn set_frequency(&mut self, frequency: MeasuresPerSec) {
        self.set_frequency_raw(frequency.0);
    }

    fn set_frequency_raw(&mut self, frequency: f32) {
        let mut frequency = frequency;
        if frequency < 0.0 {
            frequency = -frequency;
            self.coords.set_direction(-1);
        } else {
            self.coords.set_direction(1);
        }

        self.last_freq = frequency;
        // measures per second to a period in microseconds per step
        let mut period = 1_000_000.0 / (frequency * self.steps_per_measure as f32);
        if period < self.min_period_micros {
            period = self.min_period_micros;
        }
        if self.waveform == StepWaveform::Square {
            period /= 2.0;
        }

        if period.is_finite() && fabsf(period) <= MAX_PERIOD_MICROS {
            period *= SUB_MICROS_PER_MICRO;
            self.last_period_set = libm::roundf(period) as u32;

            // adjust the period for host clock inaccuracy
            period *= SIDEREAL_PERIOD_SUB_MICROS / self.observed_period_sub_micros;
            let corrected = libm::roundf(period) as u32;
            // if this is already the active period, leave the hardware alone
            if self.last_period == corrected {
                return;
            }
            self.last_period = corrected;
        } else {
            self.last_period_set = 0;
            self.last_period = 0;
        }
        self.scheduler.set_period_sub_micros(self.task, self.last_period);
    }

    /// Magnitude of the most recently demanded rate, in measures/s,
    /// before period quantization.
    #[inline]
    pub fn last_frequency(&self) -> MeasuresPerSec {
        MeasuresPerSec(self.last_freq)
    }

    /// Commanded rate magnitude recovered from the last-set period, in
    /// measures/s. Zero when pulsing is stopped.
    pub fn frequency(&self) -> MeasuresPerSec {
        MeasuresPerSec(self.frequency_steps() / self.steps_per_measure as f32)
    }

    /// Commanded rate magnitude recovered from the last-set period, in
    /// steps/s. Zero when pulsing is stopped.
    pub fn frequency_steps(&self) -> f32 {
        if self.last_period_set == 0 {
            return 0.0;
        }
        match self.waveform {
            StepWaveform::Square => 16_000_000.0 / (self.last_period_set as f32 * 2.0),
            StepWaveform::Pulse => 16_000_000.0 / self.last_period_set as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    // The controller is exercised end to end with mock collaborators in
    // tests/axis_tests.rs; the ramp, mode, coordinate and monitor pieces
    // carry their own unit tests alongside their modules.
}
