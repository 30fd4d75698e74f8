//! # axis-motion
//!
//! Single-axis motion control for tracking mounts, with embedded-hal 1.0 support.
//!
//! The crate drives one rotational or linear axis of a positioning device:
//! it turns a target coordinate in physical units into a stream of step
//! pulses at a ramped rate, while handling backlash take-up, travel limits,
//! and the stepper driver's microstep mode switching.
//!
//! ## Features
//!
//! - **Poll-driven**: a single [`Axis::poll`] entry point, called at a fixed
//!   cadence by an external scheduler; no internal timers or threads
//! - **Interrupt-safe counters**: motor/target/index/origin step counters
//!   live behind a critical section shared with the pulse-generation ISR
//! - **Acceleration ramps**: time-based and distance-based slews, graceful
//!   stop and fast abort, all shaped per poll cycle
//! - **Microstep mode protocol**: two-phase handshake between a fine
//!   "tracking" mode and a coarse "slewing" mode, with rate hysteresis
//! - **Configuration-driven**: axes defined in TOML files (with `std`)
//! - **no_std compatible**: core library works without the standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use axis_motion::{Axis, SenseHandle, SystemConfig, TaskHandle};
//!
//! // Load configuration from TOML
//! let config: SystemConfig = axis_motion::load_config("axes.toml")?;
//!
//! // Create the axis with its hardware collaborators
//! let mut axis = Axis::new(
//!     config.axis("ra").unwrap(),
//!     driver,
//!     sense,
//!     scheduler,
//!     TaskHandle(1),
//!     SenseHandle(0),
//!     SenseHandle(1),
//!     Some(enable_pin),
//! )?;
//!
//! // Slew toward a target; the scheduler calls poll() at 100 Hz
//! axis.set_target_coordinate(1.2345);
//! axis.auto_slew_rate_by_distance(0.5);
//! loop { axis.poll(); }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

/// Slew lifecycle messages, compiled out unless `defmt` is enabled.
macro_rules! msg {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::debug!($($arg)*);
    };
}

pub(crate) use msg;

// Core modules
pub mod axis;
pub mod config;
pub mod error;
pub mod hal;

// Re-exports for ergonomic API
pub use axis::{
    Axis, AutoRate, CoordStore, Direction, LimitFlags, MicrostepModeControl, POLL_HZ,
};
pub use config::{validate_config, AxisConfig, SystemConfig, TravelLimits};
pub use error::{AxisError, ConfigError, Error, Result};
pub use hal::{DriverStatus, LimitSense, PulseScheduler, SenseHandle, StepDriver, TaskHandle};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::load_config;

// Unit types
pub use config::units::{Measures, MeasuresPerSec, MeasuresPerSecSquared, StepWaveform, Steps};
