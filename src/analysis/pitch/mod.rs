// PitchExtractor - fundamental frequency tracking on the time-domain buffer
//
// Two interchangeable detectors share the same search range and threshold:
// - Autocorrelation: threshold is a correlation floor
// - YIN: threshold is a ceiling on the normalized difference
// The extractor adds frame-to-frame change rate on top of either.

mod autocorrelation;
mod yin;

use serde::{Deserialize, Serialize};

use super::types::PitchData;
use crate::config::PitchConfig;
use crate::error::ConfigError;

/// Pitch detection algorithm selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchAlgorithm {
    Autocorrelation,
    #[default]
    Yin,
}

/// Raw detector output before change-rate tracking
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PitchEstimate {
    pub frequency: f32,
    pub confidence: f32,
}

impl PitchEstimate {
    pub const NONE: PitchEstimate = PitchEstimate {
        frequency: 0.0,
        confidence: 0.0,
    };
}

#[derive(Debug, Clone)]
pub struct PitchExtractor {
    sample_rate: u32,
    algorithm: PitchAlgorithm,
    min_frequency: f32,
    max_frequency: f32,
    confidence_threshold: f32,
    last_frequency: f32,
    last_change_rate: f32,
    last_timestamp_ms: Option<f64>,
}

impl PitchExtractor {
    /// Create a pitch extractor for a capture running at `sample_rate`
    ///
    /// # Errors
    /// `InvalidSampleRate` for a zero rate, `InvalidFrequencyRange` when the
    /// configured range is empty or non-positive
    pub fn new(sample_rate: u32, config: &PitchConfig) -> Result<Self, ConfigError> {
        if sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate { sample_rate });
        }
        check_frequency_range(config.min_frequency, config.max_frequency)?;

        Ok(Self {
            sample_rate,
            algorithm: config.algorithm,
            min_frequency: config.min_frequency,
            max_frequency: config.max_frequency,
            confidence_threshold: config.confidence_threshold.clamp(0.0, 1.0),
            last_frequency: 0.0,
            last_change_rate: 0.0,
            last_timestamp_ms: None,
        })
    }

    /// Estimate the fundamental of one time-domain frame
    ///
    /// # Arguments
    /// * `time_domain` - Amplitude samples in [-1, 1]
    /// * `now_ms` - Frame timestamp in milliseconds
    ///
    /// # Returns
    /// `PitchData` with frequency 0 when nothing crossed the threshold. The
    /// change rate is only non-zero when this frame and the previous one
    /// both carried a pitch. An empty buffer yields `PitchData::default()`
    /// and leaves the previous frame untouched.
    pub fn extract(&mut self, time_domain: &[f32], now_ms: f64) -> PitchData {
        if time_domain.is_empty() {
            return PitchData::default();
        }

        let sample_rate = self.sample_rate as f32;
        let estimate = match self.algorithm {
            PitchAlgorithm::Autocorrelation => autocorrelation::detect(
                time_domain,
                sample_rate,
                self.min_frequency,
                self.max_frequency,
                self.confidence_threshold,
            ),
            PitchAlgorithm::Yin => yin::detect(
                time_domain,
                sample_rate,
                self.min_frequency,
                self.max_frequency,
                self.confidence_threshold,
            ),
        };

        let change_rate = match self.last_timestamp_ms {
            Some(last) if now_ms > last && self.last_frequency > 0.0 && estimate.frequency > 0.0 => {
                let elapsed_s = ((now_ms - last) / 1000.0) as f32;
                (estimate.frequency - self.last_frequency) / elapsed_s
            }
            _ => 0.0,
        };

        self.last_frequency = estimate.frequency;
        self.last_change_rate = change_rate;
        self.last_timestamp_ms = Some(now_ms);

        tracing::trace!(
            frequency = estimate.frequency,
            confidence = estimate.confidence,
            change_rate,
            "pitch frame"
        );

        PitchData {
            frequency: estimate.frequency,
            confidence: estimate.confidence,
            change_rate,
        }
    }

    /// Replace the search range
    ///
    /// # Errors
    /// `InvalidFrequencyRange` when `min <= 0` or `min >= max`; the previous
    /// range stays in effect
    pub fn set_frequency_range(&mut self, min: f32, max: f32) -> Result<(), ConfigError> {
        check_frequency_range(min, max)?;
        self.min_frequency = min;
        self.max_frequency = max;
        Ok(())
    }

    /// Set the detector threshold (clamped to [0, 1])
    pub fn set_confidence_threshold(&mut self, threshold: f32) {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    pub fn frequency_range(&self) -> (f32, f32) {
        (self.min_frequency, self.max_frequency)
    }

    pub fn algorithm(&self) -> PitchAlgorithm {
        self.algorithm
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Change rate reported by the most recent frame
    pub fn last_change_rate(&self) -> f32 {
        self.last_change_rate
    }

    /// Reset internal state
    pub fn reset(&mut self) {
        self.last_frequency = 0.0;
        self.last_change_rate = 0.0;
        self.last_timestamp_ms = None;
    }
}

fn check_frequency_range(min: f32, max: f32) -> Result<(), ConfigError> {
    if min > 0.0 && min < max && max.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidFrequencyRange { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{generate_silence, generate_sine_wave};

    fn extractor(algorithm: PitchAlgorithm) -> PitchExtractor {
        let config = PitchConfig {
            algorithm,
            ..PitchConfig::default()
        };
        PitchExtractor::new(44100, &config).unwrap()
    }

    fn assert_recovers(algorithm: PitchAlgorithm, frequency: f32) {
        let mut extractor = extractor(algorithm);
        let signal = generate_sine_wave(44100, frequency, 2048, 0.8);
        let pitch = extractor.extract(&signal, 0.0);

        println!(
            "{:?} {} Hz -> {} Hz (confidence {})",
            algorithm, frequency, pitch.frequency, pitch.confidence
        );
        assert!(
            (pitch.frequency - frequency).abs() / frequency < 0.02,
            "{:?}: expected ~{} Hz, got {} Hz",
            algorithm,
            frequency,
            pitch.frequency
        );
        assert!(pitch.confidence >= 0.8);
        assert_eq!(pitch.change_rate, 0.0);
    }

    #[test]
    fn test_yin_recovers_sine() {
        for frequency in [110.0, 220.0, 330.0, 440.0] {
            assert_recovers(PitchAlgorithm::Yin, frequency);
        }
    }

    #[test]
    fn test_autocorrelation_recovers_sine() {
        for frequency in [110.0, 220.0, 330.0, 440.0] {
            assert_recovers(PitchAlgorithm::Autocorrelation, frequency);
        }
    }

    #[test]
    fn test_silence_reports_no_pitch() {
        for algorithm in [PitchAlgorithm::Yin, PitchAlgorithm::Autocorrelation] {
            let mut extractor = extractor(algorithm);
            let pitch = extractor.extract(&generate_silence(2048), 0.0);
            assert_eq!(pitch, PitchData::default());
        }
    }

    #[test]
    fn test_change_rate_between_voiced_frames() {
        let mut extractor = extractor(PitchAlgorithm::Yin);
        let first = extractor.extract(&generate_sine_wave(44100, 200.0, 2048, 0.8), 1000.0);
        let second = extractor.extract(&generate_sine_wave(44100, 250.0, 2048, 0.8), 1100.0);

        let expected = (second.frequency - first.frequency) / 0.1;
        assert!(
            (second.change_rate - expected).abs() < 1e-2,
            "expected {} Hz/s, got {}",
            expected,
            second.change_rate
        );
        assert!(second.change_rate > 0.0);
    }

    #[test]
    fn test_change_rate_zero_after_unvoiced_frame() {
        let mut extractor = extractor(PitchAlgorithm::Yin);
        extractor.extract(&generate_silence(2048), 0.0);
        let pitch = extractor.extract(&generate_sine_wave(44100, 220.0, 2048, 0.8), 16.0);
        assert!(pitch.frequency > 0.0);
        assert_eq!(pitch.change_rate, 0.0);
    }

    #[test]
    fn test_empty_buffer_keeps_previous_frame() {
        let mut extractor = extractor(PitchAlgorithm::Yin);
        let first = extractor.extract(&generate_sine_wave(44100, 200.0, 2048, 0.8), 1000.0);

        assert_eq!(extractor.extract(&[], 1050.0), PitchData::default());
        assert_eq!(extractor.last_change_rate(), 0.0);

        let second = extractor.extract(&generate_sine_wave(44100, 250.0, 2048, 0.8), 1100.0);
        let expected = (second.frequency - first.frequency) / 0.1;
        assert!(
            (second.change_rate - expected).abs() < 1e-2,
            "expected {} Hz/s, got {}",
            expected,
            second.change_rate
        );
    }

    #[test]
    fn test_change_rate_zero_without_elapsed_time() {
        let mut extractor = extractor(PitchAlgorithm::Yin);
        let signal = generate_sine_wave(44100, 220.0, 2048, 0.8);
        extractor.extract(&signal, 500.0);
        let pitch = extractor.extract(&generate_sine_wave(44100, 300.0, 2048, 0.8), 500.0);
        assert_eq!(pitch.change_rate, 0.0);
    }

    #[test]
    fn test_frequency_is_clamped_to_range() {
        let mut extractor = extractor(PitchAlgorithm::Yin);
        extractor.set_frequency_range(100.0, 200.0).unwrap();
        let pitch = extractor.extract(&generate_sine_wave(44100, 205.0, 2048, 0.8), 0.0);
        assert!(pitch.frequency == 0.0 || (100.0..=200.0).contains(&pitch.frequency));
    }

    #[test]
    fn test_construction_fails_fast() {
        assert_eq!(
            PitchExtractor::new(0, &PitchConfig::default()).unwrap_err(),
            ConfigError::InvalidSampleRate { sample_rate: 0 }
        );

        let inverted = PitchConfig {
            min_frequency: 600.0,
            max_frequency: 80.0,
            ..PitchConfig::default()
        };
        assert!(matches!(
            PitchExtractor::new(44100, &inverted),
            Err(ConfigError::InvalidFrequencyRange { .. })
        ));
    }

    #[test]
    fn test_setters() {
        let mut extractor = extractor(PitchAlgorithm::Yin);
        assert!(extractor.set_frequency_range(300.0, 100.0).is_err());
        assert_eq!(extractor.frequency_range(), (80.0, 600.0));

        extractor.set_confidence_threshold(1.7);
        assert_eq!(extractor.confidence_threshold(), 1.0);
    }

    #[test]
    fn test_reset_forgets_previous_frame() {
        let mut extractor = extractor(PitchAlgorithm::Yin);
        extractor.extract(&generate_sine_wave(44100, 200.0, 2048, 0.8), 0.0);
        extractor.reset();
        let pitch = extractor.extract(&generate_sine_wave(44100, 300.0, 2048, 0.8), 100.0);
        assert_eq!(pitch.change_rate, 0.0);
    }
}
