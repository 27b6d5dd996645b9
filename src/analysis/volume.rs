// VolumeExtractor - decibel-domain loudness tracking
//
// Each frequency bin is normalized into [0, 1] against the analyser's dB
// window, then:
// 1. rms      = sqrt(mean(normalized²))
// 2. peak     = normalized(max raw dB), held by an envelope follower with
//               instant attack and a 0.995/frame release
// 3. smoothed = α·smoothed + (1-α)·rms

use super::types::VolumeData;
use crate::error::ConfigError;
use crate::util::math::normalize_decibels;

/// Per-frame multiplicative release of the peak envelope
const PEAK_DECAY: f32 = 0.995;

#[derive(Debug, Clone)]
pub struct VolumeExtractor {
    smoothing_factor: f32,
    min_db: f32,
    max_db: f32,
    current_volume: f32,
    peak_volume: f32,
}

impl VolumeExtractor {
    /// Create a volume extractor
    ///
    /// # Arguments
    /// * `smoothing_factor` - EMA factor α (0.0-1.0, default 0.8)
    /// * `min_db` - Decibel value mapped to 0.0
    /// * `max_db` - Decibel value mapped to 1.0
    ///
    /// # Errors
    /// `InvalidDecibelRange` when `min_db >= max_db`, `InvalidSmoothing` when
    /// the factor is outside [0, 1]
    pub fn new(smoothing_factor: f32, min_db: f32, max_db: f32) -> Result<Self, ConfigError> {
        if !(min_db < max_db) {
            return Err(ConfigError::InvalidDecibelRange { min_db, max_db });
        }
        if !(0.0..=1.0).contains(&smoothing_factor) {
            return Err(ConfigError::InvalidSmoothing {
                name: "volume smoothing",
                value: smoothing_factor,
            });
        }

        Ok(Self {
            smoothing_factor,
            min_db,
            max_db,
            current_volume: 0.0,
            peak_volume: 0.0,
        })
    }

    /// Extract loudness features from a decibel spectrum
    ///
    /// An empty spectrum returns all zeros and leaves the smoothing and peak
    /// state untouched.
    pub fn extract(&mut self, frequency_db: &[f32]) -> VolumeData {
        if frequency_db.is_empty() {
            return VolumeData::default();
        }

        let mut sum_squares = 0.0f32;
        let mut max_db = f32::NEG_INFINITY;
        for &db in frequency_db {
            let normalized = normalize_decibels(db, self.min_db, self.max_db);
            sum_squares += normalized * normalized;
            if db > max_db {
                max_db = db;
            }
        }

        let rms = (sum_squares / frequency_db.len() as f32).sqrt();
        let peak = normalize_decibels(max_db, self.min_db, self.max_db);

        self.current_volume =
            self.smoothing_factor * self.current_volume + (1.0 - self.smoothing_factor) * rms;
        self.peak_volume = peak.max(self.peak_volume * PEAK_DECAY);

        VolumeData {
            rms: rms.clamp(0.0, 1.0),
            peak: self.peak_volume.clamp(0.0, 1.0),
            smoothed: self.current_volume.clamp(0.0, 1.0),
        }
    }

    /// Set the EMA factor (clamped to [0, 1])
    pub fn set_smoothing_factor(&mut self, factor: f32) {
        self.smoothing_factor = factor.clamp(0.0, 1.0);
    }

    pub fn smoothing_factor(&self) -> f32 {
        self.smoothing_factor
    }

    /// Reset internal state
    pub fn reset(&mut self) {
        self.current_volume = 0.0;
        self.peak_volume = 0.0;
    }
}

impl Default for VolumeExtractor {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.8,
            min_db: -90.0,
            max_db: -10.0,
            current_volume: 0.0,
            peak_volume: 0.0,
        }
    }
}
