//! Shared step counters.
//!
//! The pulse-generation interrupt advances the motor counter while the
//! poll loop reads and rewrites the same fields, so every composite access
//! (motor + index, motor + backlash, ...) runs inside a critical section.
//! Fields are never exposed raw; the store hands out whole coordinates.

use core::cell::RefCell;

use critical_section::Mutex;

/// The per-axis step counters shared with the pulse interrupt.
///
/// - `motor`: actual commanded motor position, advanced by the pulse
///   context on every pulse
/// - `target`: destination relative to the index offset
/// - `index`: offset between the motor frame and the instrument frame
/// - `origin`: snapshot of `motor` at the start of a distance-based slew
/// - `backlash` / `backlash_amount` / `backlash_store`: current backlash
///   deficit, configured maximum, and the save slot used while
///   compensation is disabled
/// - `direction`: step sign applied at pulse time (+1 forward, -1 reverse)
/// - `step_size`: steps per pulse (1 tracking, the microstep multiplier
///   while slewing)
#[derive(Debug, Clone, Copy)]
struct StepCounters {
    motor: i64,
    target: i64,
    index: i64,
    origin: i64,
    backlash: i64,
    backlash_amount: i64,
    backlash_store: i64,
    direction: i8,
    step_size: i64,
}

impl StepCounters {
    const fn new() -> Self {
        Self {
            motor: 0,
            target: 0,
            index: 0,
            origin: 0,
            backlash: 0,
            backlash_amount: 0,
            backlash_store: 0,
            direction: 1,
            step_size: 1,
        }
    }
}

/// Coordinate store: interrupt-safe access to the shared step counters.
///
/// One instance lives inside each [`crate::Axis`]; the pulse generator
/// receives a shared reference and drives [`CoordStore::apply_step`] from
/// interrupt context. Everything else is called from normal context.
#[derive(Debug)]
pub struct CoordStore {
    inner: Mutex<RefCell<StepCounters>>,
}

impl Default for CoordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordStore {
    /// Create a store with all counters zeroed.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(StepCounters::new())),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut StepCounters) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Hard position reset: sets the motor counter and rebases target,
    /// index and backlash onto it. This is not a move.
    pub fn set_motor_steps(&self, value: i64) {
        self.with(|c| {
            c.index = 0;
            c.motor = value;
            c.target = value;
            c.backlash = 0;
        });
    }

    /// Motor position in steps, including any un-taken backlash.
    pub fn motor_steps(&self) -> i64 {
        self.with(|c| c.motor + c.backlash)
    }

    /// Instrument position in steps (motor frame plus index offset).
    pub fn instrument_steps(&self) -> i64 {
        self.with(|c| c.motor + c.index)
    }

    /// Relabel the instrument position without moving the motor: only the
    /// index offset changes.
    pub fn set_instrument_steps(&self, value: i64) {
        self.with(|c| c.index = value - c.motor);
    }

    /// Set the target from an instrument-frame step count.
    pub fn set_target_steps(&self, value: i64) {
        self.with(|c| c.target = value - c.index);
    }

    /// Target position in instrument-frame steps.
    pub fn target_steps(&self) -> i64 {
        self.with(|c| c.target + c.index)
    }

    /// Snapshot the motor position as the slew origin.
    pub fn mark_origin(&self) {
        self.with(|c| c.origin = c.motor);
    }

    /// Steps to the nearer of the slew origin or the target, used to shape
    /// distance-based ramps.
    pub fn origin_or_target_distance_steps(&self) -> i64 {
        self.with(|c| {
            let distance_origin = (c.origin - c.motor).abs();
            let distance_target = (c.target - c.motor).abs();
            distance_origin.min(distance_target)
        })
    }

    /// Sign of the remaining travel to the target (+1 forward, -1 reverse).
    pub fn target_direction(&self) -> i8 {
        self.with(|c| if c.target >= c.motor { 1 } else { -1 })
    }

    /// True when the motor is within twice the current step granularity of
    /// the target.
    pub fn near_target(&self) -> bool {
        self.with(|c| (c.motor - c.target).abs() <= c.step_size * 2)
    }

    /// Set the step sign applied at pulse time.
    pub fn set_direction(&self, direction: i8) {
        self.with(|c| c.direction = direction);
    }

    /// Current step sign (+1 forward, -1 reverse).
    pub fn direction(&self) -> i8 {
        self.with(|c| c.direction)
    }

    /// Set the steps-per-pulse granularity.
    pub fn set_step_size(&self, step_size: i64) {
        self.with(|c| c.step_size = step_size.max(1));
    }

    /// Current steps-per-pulse granularity.
    pub fn step_size(&self) -> i64 {
        self.with(|c| c.step_size)
    }

    /// Configure the backlash window size in steps.
    pub fn set_backlash_amount(&self, steps: i64) {
        self.with(|c| c.backlash_amount = steps.max(0));
    }

    /// Configured backlash window size in steps.
    pub fn backlash_amount(&self) -> i64 {
        self.with(|c| c.backlash_amount)
    }

    /// Current backlash deficit in steps.
    pub fn backlash_steps(&self) -> i64 {
        self.with(|c| c.backlash)
    }

    /// True while strictly inside the backlash window: some slack has been
    /// taken up but not all of it.
    pub fn in_backlash(&self) -> bool {
        self.with(|c| c.backlash > 0 && c.backlash < c.backlash_amount)
    }

    /// Fold the backlash deficit into the motor counter and zero it, so
    /// the reported position is unchanged while compensation is off.
    pub fn disable_backlash(&self) {
        self.with(|c| {
            c.backlash_store = c.backlash;
            c.motor += c.backlash;
            c.backlash = 0;
        });
    }

    /// Restore the saved backlash deficit and subtract it back out of the
    /// motor counter. Exact inverse of [`CoordStore::disable_backlash`].
    pub fn enable_backlash(&self) {
        self.with(|c| {
            c.backlash = c.backlash_store;
            c.motor -= c.backlash;
            c.backlash_store = 0;
        });
    }

    /// Pulse-context entry: advance the counters by one pulse in the
    /// current direction. Backlash is taken up one step at a time before
    /// the motor counter moves.
    pub fn apply_step(&self) {
        self.with(|c| {
            if c.direction >= 0 {
                if c.backlash < c.backlash_amount {
                    c.backlash += 1;
                } else {
                    c.motor += c.step_size;
                }
            } else if c.backlash > 0 {
                c.backlash -= 1;
            } else {
                c.motor -= c.step_size;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motor_reset_rebases_everything() {
        let store = CoordStore::new();
        store.set_instrument_steps(500);
        store.set_target_steps(900);
        store.set_backlash_amount(10);
        store.apply_step();

        store.set_motor_steps(1234);
        assert_eq!(store.motor_steps(), 1234);
        assert_eq!(store.instrument_steps(), 1234);
        assert_eq!(store.target_steps(), 1234);
        assert_eq!(store.backlash_steps(), 0);
    }

    #[test]
    fn test_instrument_relabel_keeps_motor() {
        let store = CoordStore::new();
        store.set_motor_steps(1000);
        store.set_instrument_steps(5000);

        assert_eq!(store.instrument_steps(), 5000);
        assert_eq!(store.motor_steps(), 1000);
    }

    #[test]
    fn test_target_is_index_relative() {
        let store = CoordStore::new();
        store.set_motor_steps(0);
        store.set_instrument_steps(100);
        store.set_target_steps(150);

        assert_eq!(store.target_steps(), 150);
        // motor only needs to travel 50 steps
        assert_eq!(store.origin_or_target_distance_steps(), 50);
    }

    #[test]
    fn test_near_target_scales_with_step_size() {
        let store = CoordStore::new();
        store.set_motor_steps(0);
        store.set_target_steps(3);

        assert!(!store.near_target());
        store.set_step_size(2);
        assert!(store.near_target());
    }

    #[test]
    fn test_origin_or_target_distance_takes_nearer() {
        let store = CoordStore::new();
        store.set_motor_steps(0);
        store.mark_origin();
        store.set_target_steps(1000);

        // 100 steps from origin, 900 from target
        for _ in 0..100 {
            store.apply_step();
        }
        assert_eq!(store.origin_or_target_distance_steps(), 100);
    }

    #[test]
    fn test_backlash_window() {
        let store = CoordStore::new();
        store.set_backlash_amount(3);

        assert!(!store.in_backlash());
        store.apply_step();
        assert!(store.in_backlash());
        store.apply_step();
        store.apply_step();
        // deficit reached the configured maximum
        assert_eq!(store.backlash_steps(), 3);
        assert!(!store.in_backlash());
    }

    #[test]
    fn test_backlash_consumed_before_motor_moves() {
        let store = CoordStore::new();
        store.set_backlash_amount(2);
        store.apply_step();
        store.apply_step();
        assert_eq!(store.with(|c| c.motor), 0);

        store.apply_step();
        assert_eq!(store.with(|c| c.motor), 1);

        // reversing unwinds the deficit first
        store.set_direction(-1);
        store.apply_step();
        store.apply_step();
        assert_eq!(store.with(|c| c.motor), 1);
        store.apply_step();
        assert_eq!(store.with(|c| c.motor), 0);
    }

    #[test]
    fn test_disable_enable_backlash_is_identity() {
        let store = CoordStore::new();
        store.set_motor_steps(100);
        store.set_backlash_amount(10);
        store.apply_step();
        store.apply_step();

        let motor = store.motor_steps();
        let instrument = store.instrument_steps();

        store.disable_backlash();
        assert_eq!(store.backlash_steps(), 0);
        assert_eq!(store.motor_steps(), motor);

        store.enable_backlash();
        assert_eq!(store.backlash_steps(), 2);
        assert_eq!(store.motor_steps(), motor);
        assert_eq!(store.instrument_steps(), instrument);
    }
}
