//! Per-axis configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::limits::TravelLimits;
use super::units::{Measures, MeasuresPerSec, MeasuresPerSecSquared, StepWaveform};

/// Complete configuration for one axis.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Motor steps per physical unit of axis travel. Must be > 0 and is
    /// fixed for the axis's lifetime.
    pub steps_per_measure: f64,

    /// Constant tracking-rate bias in measures per second, added to the
    /// ramped rate while tracking is on.
    #[serde(default, rename = "base_freq_measures_per_sec")]
    pub base_freq: MeasuresPerSec,

    /// Maximum slew rate in measures per second.
    #[serde(rename = "max_freq_measures_per_sec")]
    pub max_freq: MeasuresPerSec,

    /// Slew acceleration in measures per second squared.
    #[serde(rename = "slew_accel_measures_per_sec2")]
    pub slew_accel: MeasuresPerSecSquared,

    /// Abort deceleration in measures per second squared, typically faster
    /// than the slew rate.
    #[serde(rename = "abort_accel_measures_per_sec2")]
    pub abort_accel: MeasuresPerSecSquared,

    /// Mechanical backlash to take up on direction reversal, in measures.
    #[serde(default, rename = "backlash_measures")]
    pub backlash: Measures,

    /// Rate used to drive through the backlash window, in measures per
    /// second. Also anchors the microstep mode-switch hysteresis threshold.
    #[serde(
        default = "default_backlash_freq",
        rename = "backlash_freq_measures_per_sec"
    )]
    pub backlash_freq: MeasuresPerSec,

    /// Invert the enable output polarity.
    #[serde(default)]
    pub invert_enable: bool,

    /// Optional software travel limits.
    #[serde(default)]
    pub limits: Option<TravelLimits>,

    /// Whether software limit checking starts enabled.
    #[serde(default)]
    pub limits_check: bool,

    /// Step waveform generated by the pulse hardware.
    #[serde(default)]
    pub waveform: StepWaveform,
}

fn default_backlash_freq() -> MeasuresPerSec {
    MeasuresPerSec(0.05)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AxisConfig {
        AxisConfig {
            name: String::try_from("test").unwrap(),
            steps_per_measure: 10000.0,
            base_freq: MeasuresPerSec(0.004),
            max_freq: MeasuresPerSec(2.0),
            slew_accel: MeasuresPerSecSquared(1.0),
            abort_accel: MeasuresPerSecSquared(4.0),
            backlash: Measures(0.0),
            backlash_freq: default_backlash_freq(),
            invert_enable: false,
            limits: None,
            limits_check: false,
            waveform: StepWaveform::Square,
        }
    }

    #[test]
    fn test_config_construction() {
        let config = base_config();
        assert_eq!(config.name.as_str(), "test");
        assert!((config.backlash_freq.0 - 0.05).abs() < 1e-6);
    }
}
