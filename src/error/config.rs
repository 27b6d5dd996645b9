// Configuration error types

use crate::error::ErrorCode;
use log::error;
use thiserror::Error;

/// Log a configuration error with structured context
///
/// Logs the numeric code, the component that rejected the value and the
/// human-readable message.
pub fn log_config_error(err: &ConfigError, component: &str) {
    error!(
        "Config error in {}: code={}, message={}",
        component,
        err.code(),
        err.message()
    );
}

/// Configuration misuse detected at construction time or in a setter
///
/// Error code range: 3001-3008
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Decibel window is empty or inverted (min must be < max)
    #[error("invalid decibel range: min {min_db} dB must be below max {max_db} dB")]
    InvalidDecibelRange { min_db: f32, max_db: f32 },

    /// Pitch search range is empty, inverted or non-positive
    #[error("invalid frequency range: {min} Hz .. {max} Hz")]
    InvalidFrequencyRange { min: f32, max: f32 },

    /// Sample rate must be positive
    #[error("invalid sample rate: {sample_rate} Hz")]
    InvalidSampleRate { sample_rate: u32 },

    /// Threshold outside [0, 1] or not finite
    #[error("invalid {name} threshold: {value}")]
    InvalidThreshold { name: &'static str, value: f32 },

    /// VAD window must hold at least one frame
    #[error("invalid VAD window size: {size}")]
    InvalidWindowSize { size: usize },

    /// At least one band is required
    #[error("invalid band count: {count}")]
    InvalidBandCount { count: usize },

    /// Smoothing factors and speeds must be finite and within bounds
    #[error("invalid {name}: {value}")]
    InvalidSmoothing { name: &'static str, value: f32 },

    /// FFT size must be a power of two in 32..=32768
    #[error("invalid FFT size: {size} (expected a power of two in 32..=32768)")]
    InvalidFftSize { size: usize },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> i32 {
        match self {
            ConfigError::InvalidDecibelRange { .. } => 3001,
            ConfigError::InvalidFrequencyRange { .. } => 3002,
            ConfigError::InvalidSampleRate { .. } => 3003,
            ConfigError::InvalidThreshold { .. } => 3004,
            ConfigError::InvalidWindowSize { .. } => 3005,
            ConfigError::InvalidBandCount { .. } => 3006,
            ConfigError::InvalidSmoothing { .. } => 3007,
            ConfigError::InvalidFftSize { .. } => 3008,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
