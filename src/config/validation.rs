//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{AxisConfig, SystemConfig};

/// Validate a system configuration.
///
/// Checks:
/// - Steps per measure is positive
/// - Maximum frequency and acceleration rates are positive
/// - Backlash amount is non-negative and its take-up rate positive
/// - Travel limits are valid (min < max)
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (name, axis) in config.axes.iter() {
        validate_axis(name.as_str(), axis)?;
    }

    Ok(())
}

/// Validate a single axis configuration.
pub fn validate_axis(_name: &str, config: &AxisConfig) -> Result<()> {
    if config.steps_per_measure <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidStepsPerMeasure(
            config.steps_per_measure,
        )));
    }

    if config.max_freq.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidMaxFrequency(
            config.max_freq.0,
        )));
    }

    if config.slew_accel.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidAcceleration(
            config.slew_accel.0,
        )));
    }

    if config.abort_accel.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidAcceleration(
            config.abort_accel.0,
        )));
    }

    if config.backlash.0 < 0.0 {
        return Err(Error::Config(ConfigError::InvalidBacklash(config.backlash.0)));
    }

    if config.backlash_freq.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidBacklashFrequency(
            config.backlash_freq.0,
        )));
    }

    if let Some(ref limits) = config.limits {
        if !limits.is_valid() {
            return Err(Error::Config(ConfigError::InvalidTravelLimits {
                min: limits.min.0,
                max: limits.max.0,
            }));
        }
    }

    Ok(())
}
