//! Error types for axis-motion.
//!
//! Only configuration and setup problems surface as errors. Runtime motion
//! faults (driver fault, limit trips) are vetoes handled inside the poll
//! loop: the axis aborts to a safe stopped state and the fault flags stay
//! queryable, so none of them appear in this taxonomy.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all axis-motion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Axis setup error
    Axis(AxisError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Axis name not found in configuration
    AxisNotFound(heapless::String<32>),
    /// Invalid steps per measure (must be > 0)
    InvalidStepsPerMeasure(f64),
    /// Invalid maximum frequency (must be > 0)
    InvalidMaxFrequency(f32),
    /// Invalid acceleration rate (must be > 0)
    InvalidAcceleration(f32),
    /// Invalid backlash amount (must be >= 0)
    InvalidBacklash(f64),
    /// Invalid backlash take-up frequency (must be > 0)
    InvalidBacklashFrequency(f32),
    /// Invalid travel limits (min must be < max)
    InvalidTravelLimits {
        /// Minimum limit value in measures
        min: f64,
        /// Maximum limit value in measures
        max: f64,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Axis setup errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisError {
    /// Enable pin operation failed
    EnablePin,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Axis(e) => write!(f, "Axis error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::AxisNotFound(name) => write!(f, "Axis '{}' not found", name),
            ConfigError::InvalidStepsPerMeasure(v) => {
                write!(f, "Invalid steps per measure: {}. Must be > 0", v)
            }
            ConfigError::InvalidMaxFrequency(v) => {
                write!(f, "Invalid max frequency: {}. Must be > 0", v)
            }
            ConfigError::InvalidAcceleration(v) => {
                write!(f, "Invalid acceleration rate: {}. Must be > 0", v)
            }
            ConfigError::InvalidBacklash(v) => {
                write!(f, "Invalid backlash amount: {}. Must be >= 0", v)
            }
            ConfigError::InvalidBacklashFrequency(v) => {
                write!(f, "Invalid backlash frequency: {}. Must be > 0", v)
            }
            ConfigError::InvalidTravelLimits { min, max } => {
                write!(f, "Invalid travel limits: min ({}) must be < max ({})", min, max)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for AxisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisError::EnablePin => write!(f, "Enable pin operation failed"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<AxisError> for Error {
    fn from(e: AxisError) -> Self {
        Error::Axis(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for AxisError {}
