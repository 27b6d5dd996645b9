//! Configuration management for the waveform pipeline
//!
//! This module provides runtime configuration loading from JSON files so
//! analyser windows, pitch search ranges and mapping ranges can be tuned
//! without recompilation. Every value is checked by [`AppConfig::validate`]
//! before an engine is built from it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::analysis::{EmotionType, PitchAlgorithm};
use crate::error::ConfigError;
use crate::mapping::{EmotionColorPreset, ValueRange};

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub mapping: MappingConfig,
    pub animation: AnimationConfig,
    /// Emotion whose preset is applied before the first frame
    pub initial_emotion: EmotionType,
    /// Extra presets registered on top of the built-in table
    pub custom_presets: BTreeMap<String, EmotionColorPreset>,
}

/// Analyser and feature extractor parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// FFT window size in samples (power of two)
    pub fft_size: usize,
    /// Temporal smoothing of the analyser magnitude spectrum (0.0-1.0)
    pub smoothing_time_constant: f32,
    /// Bottom of the decibel window used for normalization
    pub min_decibels: f32,
    /// Top of the decibel window used for normalization
    pub max_decibels: f32,
    /// Number of output bands from the multiband processor
    pub band_count: usize,
    /// EMA factor for per-band smoothing
    pub band_smoothing: f32,
    pub pitch: PitchConfig,
    pub vad: VadConfig,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing_time_constant: 0.8,
            min_decibels: -90.0,
            max_decibels: -10.0,
            band_count: 24,
            band_smoothing: 0.7,
            pitch: PitchConfig::default(),
            vad: VadConfig::default(),
        }
    }
}

/// Pitch detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchConfig {
    pub algorithm: PitchAlgorithm,
    /// Lowest detectable fundamental in Hz
    pub min_frequency: f32,
    /// Highest detectable fundamental in Hz
    pub max_frequency: f32,
    /// Correlation floor (autocorrelation) or CMND ceiling (YIN)
    pub confidence_threshold: f32,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            algorithm: PitchAlgorithm::Yin,
            min_frequency: 80.0,
            max_frequency: 600.0,
            confidence_threshold: 0.8,
        }
    }
}

/// Voice activity detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VadConfig {
    /// Mean normalized energy above which a frame counts as active
    pub threshold: f32,
    /// Number of trailing frames in the activity window
    pub window_size: usize,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            threshold: 0.01,
            window_size: 30,
        }
    }
}

/// Ranges used by the mapping channels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub amplitude_range: ValueRange,
    pub spacing_range: ValueRange,
    pub speed_range: ValueRange,
    /// Transition duration range in milliseconds
    pub transition_range: ValueRange,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            amplitude_range: ValueRange::new(0.0, 1.0),
            spacing_range: ValueRange::new(1.0, 10.0),
            speed_range: ValueRange::new(0.4, 1.8),
            transition_range: ValueRange::new(200.0, 800.0),
        }
    }
}

/// Frame pacing and interpolation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Nominal frame rate used by offline drivers (CLI, fixtures)
    pub fps: u32,
    /// Exponential interpolation speed of the unified interpolator
    pub lerp_speed: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            lerp_speed: 5.0,
        }
    }
}

fn check_unit(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidSmoothing { name, value })
    }
}

impl AppConfig {
    /// Lenient loader: read, parse and validate a JSON config file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The file's configuration, or the defaults when it cannot be read,
    /// parsed or validated. The reason is logged as a warning.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let loaded = fs::read_to_string(path)
            .map_err(|err| format!("unreadable ({err})"))
            .and_then(|contents| {
                Self::from_json_str(&contents).map_err(|err| format!("invalid JSON ({err})"))
            })
            .and_then(|config| {
                config
                    .validate()
                    .map(|()| config)
                    .map_err(|err| format!("rejected ({err})"))
            });

        match loaded {
            Ok(config) => {
                log::info!(
                    "[Config] Using {} (bands={}, initial_emotion={})",
                    path.display(),
                    config.audio.band_count,
                    config.initial_emotion
                );
                config
            }
            Err(reason) => {
                log::warn!("[Config] {} {reason}, falling back to defaults", path.display());
                Self::default()
            }
        }
    }

    /// Parse configuration from a JSON string without any fallback
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check every value that would otherwise misbehave in the per-frame path
    pub fn validate(&self) -> Result<(), ConfigError> {
        let audio = &self.audio;

        if !audio.fft_size.is_power_of_two() || !(32..=32768).contains(&audio.fft_size) {
            return Err(ConfigError::InvalidFftSize {
                size: audio.fft_size,
            });
        }
        if !(audio.min_decibels < audio.max_decibels) {
            return Err(ConfigError::InvalidDecibelRange {
                min_db: audio.min_decibels,
                max_db: audio.max_decibels,
            });
        }
        check_unit("analyser smoothing", audio.smoothing_time_constant)?;
        check_unit("band smoothing", audio.band_smoothing)?;
        if audio.band_count == 0 {
            return Err(ConfigError::InvalidBandCount { count: 0 });
        }

        let pitch = &audio.pitch;
        if !(pitch.min_frequency > 0.0 && pitch.min_frequency < pitch.max_frequency)
            || !pitch.max_frequency.is_finite()
        {
            return Err(ConfigError::InvalidFrequencyRange {
                min: pitch.min_frequency,
                max: pitch.max_frequency,
            });
        }
        if !(0.0..=1.0).contains(&pitch.confidence_threshold) {
            return Err(ConfigError::InvalidThreshold {
                name: "pitch confidence",
                value: pitch.confidence_threshold,
            });
        }

        if audio.vad.window_size == 0 {
            return Err(ConfigError::InvalidWindowSize { size: 0 });
        }
        if !(0.0..=1.0).contains(&audio.vad.threshold) {
            return Err(ConfigError::InvalidThreshold {
                name: "VAD energy",
                value: audio.vad.threshold,
            });
        }

        if !(self.animation.lerp_speed.is_finite() && self.animation.lerp_speed > 0.0) {
            return Err(ConfigError::InvalidSmoothing {
                name: "lerp speed",
                value: self.animation.lerp_speed,
            });
        }

        Ok(())
    }
}
