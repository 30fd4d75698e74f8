//! Unit types for physical quantities.
//!
//! Provides type-safe representations of axis positions ("measures" - the
//! axis's physical unit, e.g. degrees or millimetres), rates, accelerations,
//! and raw motor steps to prevent unit confusion at compile time.
//!
//! Positions use f64 (step counts grow large against fractional indexes);
//! rates and accelerations use f32, matching what the rate engine computes
//! with each poll cycle.

use core::ops::{Add, Mul, Sub};

use serde::Deserialize;

/// Axis position in measures (the axis's physical unit).
///
/// Used for configuration and the user-facing coordinate API. Internally
/// converted to [`Steps`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Measures(pub f64);

impl Measures {
    /// Create a new Measures value.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Add for Measures {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Measures {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Axis rate in measures per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct MeasuresPerSec(pub f32);

impl MeasuresPerSec {
    /// Create a new MeasuresPerSec value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

impl Mul<f32> for MeasuresPerSec {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// Axis acceleration in measures per second squared.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct MeasuresPerSecSquared(pub f32);

impl MeasuresPerSecSquared {
    /// Create a new MeasuresPerSecSquared value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

impl Mul<f32> for MeasuresPerSecSquared {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// Motor position in steps (absolute from origin).
///
/// Uses i64 for unlimited range in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Steps(pub i64);

impl Steps {
    /// Create a new Steps value.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Get absolute value as u64.
    #[inline]
    pub fn abs(self) -> u64 {
        self.0.unsigned_abs()
    }

    /// Convert to measures using the axis's steps per measure ratio.
    #[inline]
    pub fn to_measures(self, steps_per_measure: f64) -> Measures {
        Measures(self.0 as f64 / steps_per_measure)
    }

    /// Create from measures using the axis's steps per measure ratio,
    /// rounding to the nearest step.
    #[inline]
    pub fn from_measures(measures: Measures, steps_per_measure: f64) -> Self {
        Self(libm::round(measures.0 * steps_per_measure) as i64)
    }
}

impl Add for Steps {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Steps {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Step waveform generated by the pulse hardware.
///
/// A square waveform needs two half-cycles per step, so the programmed
/// period is half the step period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepWaveform {
    /// Two half-cycles per step (period is halved before programming).
    #[default]
    Square,
    /// One pulse per step.
    Pulse,
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to Measures.
    fn measures(self) -> Measures;
    /// Convert to MeasuresPerSec.
    fn measures_per_sec(self) -> MeasuresPerSec;
    /// Convert to MeasuresPerSecSquared.
    fn measures_per_sec_squared(self) -> MeasuresPerSecSquared;
}

impl UnitExt for f64 {
    #[inline]
    fn measures(self) -> Measures {
        Measures(self)
    }

    #[inline]
    fn measures_per_sec(self) -> MeasuresPerSec {
        MeasuresPerSec(self as f32)
    }

    #[inline]
    fn measures_per_sec_squared(self) -> MeasuresPerSecSquared {
        MeasuresPerSecSquared(self as f32)
    }
}
