//! Collaborator contracts for the axis controller.
//!
//! The axis core does not talk to hardware directly; it drives three
//! collaborators owned per axis: the stepper driver (electrical decay and
//! microstep mode control plus fault reporting), the digital sense inputs
//! (limit switches), and the periodic-task scheduler whose interrupt
//! actually generates step pulses. The enable output is a plain
//! `embedded_hal::digital::OutputPin`.
//!
//! All three are mutated only from normal (non-interrupt) context by the
//! poll loop; the pulse interrupt touches nothing here, only the shared
//! step counters in [`crate::axis::CoordStore`].

/// Identifies this axis's registered periodic pulse task with the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle(pub u8);

/// Identifies one digital sense input with the sense collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenseHandle(pub u8);

/// Cached stepper driver status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStatus {
    /// Driver reports an electrical or thermal fault.
    pub fault: bool,
}

/// Stepper driver mode control and status.
///
/// Microstep modes are mutually exclusive: "tracking" is the fine,
/// low-speed mode; "slewing" is the coarse, high-speed mode.
/// [`StepDriver::mode_switch_allowed`] is a query only and must not mutate
/// driver state; the commit methods may be called only when it returns
/// true, so the switch happens without losing or duplicating steps.
pub trait StepDriver {
    /// Set the electrical decay mode used while slewing.
    fn mode_decay_slewing(&mut self);

    /// Set the electrical decay mode used while tracking/holding.
    fn mode_decay_tracking(&mut self);

    /// Commit to the fine tracking microstep mode.
    fn mode_microstep_tracking(&mut self);

    /// Commit to the coarse slewing microstep mode, returning the step
    /// multiplier actually achieved (tracking microsteps per slewing step).
    fn mode_microstep_slewing(&mut self) -> i32;

    /// Whether a microstep mode switch is currently permitted. Query only.
    fn mode_switch_allowed(&self) -> bool;

    /// Refresh the cached driver status.
    fn update_status(&mut self);

    /// Get the cached driver status.
    fn status(&self) -> DriverStatus;
}

/// Digital sense inputs (limit switches).
pub trait LimitSense {
    /// Read one sense input, debounced as the implementation sees fit.
    fn read(&mut self, input: SenseHandle) -> bool;
}

/// The external periodic-task scheduler that fires the pulse interrupt.
pub trait PulseScheduler {
    /// Reprogram the recurring pulse-generation period, in sub-microsecond
    /// counts. A period of zero stops pulsing.
    fn set_period_sub_micros(&mut self, handle: TaskHandle, period: u32);
}
