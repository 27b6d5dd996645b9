// SpectrumAnalyser - PCM to the two per-frame capture buffers
//
// Processing per analysis:
// 1. Take the latest fft_size samples (zero-filled before enough arrive)
// 2. Apply a Blackman window and a forward FFT
// 3. Magnitude |X[k]| / N, smoothed over time by the time constant τ
// 4. Convert to dB (20·log10), floored at MIN_DB
//
// The output mirrors a browser analyser node: fft_size / 2 frequency bins in
// dB and the raw time-domain window.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use super::{CaptureFrame, CaptureSource};
use crate::config::AudioConfig;
use crate::error::ConfigError;

/// Decibel floor reported for silent bins
pub const MIN_DB: f32 = -160.0;

/// Accepted FFT sizes
pub const MIN_FFT_SIZE: usize = 32;
pub const MAX_FFT_SIZE: usize = 32768;

pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    sample_rate: u32,
    smoothing_time_constant: f32,
    window: Vec<f32>,
    samples: VecDeque<f32>,
    fft_buffer: Vec<Complex<f32>>,
    scratch_buffer: Vec<Complex<f32>>,
    smoothed_magnitudes: Vec<f32>,
    frequency_db: Vec<f32>,
    time_domain: Vec<f32>,
}

impl SpectrumAnalyser {
    /// Create an analyser for a stream at `sample_rate`
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate of the pushed PCM in Hz
    /// * `config` - Uses `fft_size` and `smoothing_time_constant`
    ///
    /// # Errors
    /// `InvalidSampleRate` for a zero rate, `InvalidFftSize` unless the size
    /// is a power of two in 32..=32768, `InvalidSmoothing` for a time
    /// constant outside [0, 1]
    pub fn new(sample_rate: u32, config: &AudioConfig) -> Result<Self, ConfigError> {
        let fft_size = config.fft_size;
        if sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate { sample_rate });
        }
        if !fft_size.is_power_of_two() || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size) {
            return Err(ConfigError::InvalidFftSize { size: fft_size });
        }
        let smoothing = config.smoothing_time_constant;
        if !(0.0..=1.0).contains(&smoothing) {
            return Err(ConfigError::InvalidSmoothing {
                name: "analyser smoothing",
                value: smoothing,
            });
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();
        let bin_count = fft_size / 2;

        tracing::debug!(sample_rate, fft_size, smoothing, "spectrum analyser created");

        Ok(Self {
            fft,
            fft_size,
            sample_rate,
            smoothing_time_constant: smoothing,
            window: blackman_window(fft_size),
            samples: VecDeque::with_capacity(fft_size),
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch_buffer: vec![Complex::new(0.0, 0.0); scratch_len],
            smoothed_magnitudes: vec![0.0; bin_count],
            frequency_db: vec![MIN_DB; bin_count],
            time_domain: vec![0.0; fft_size],
        })
    }

    /// Append PCM samples, keeping only the newest `fft_size`
    pub fn push_samples(&mut self, samples: &[f32]) {
        let skip = samples.len().saturating_sub(self.fft_size);
        for &sample in &samples[skip..] {
            if self.samples.len() == self.fft_size {
                self.samples.pop_front();
            }
            self.samples.push_back(sample);
        }
    }

    /// Recompute both capture buffers from the buffered samples
    pub fn analyse(&mut self) {
        let padding = self.fft_size - self.samples.len();
        for (slot, value) in self.time_domain.iter_mut().zip(
            std::iter::repeat(0.0)
                .take(padding)
                .chain(self.samples.iter().copied()),
        ) {
            *slot = value;
        }

        for (i, bin) in self.fft_buffer.iter_mut().enumerate() {
            *bin = Complex::new(self.time_domain[i] * self.window[i], 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch_buffer);

        let scale = 1.0 / self.fft_size as f32;
        let tau = self.smoothing_time_constant;
        for (k, smoothed) in self.smoothed_magnitudes.iter_mut().enumerate() {
            let magnitude = self.fft_buffer[k].norm() * scale;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
            self.frequency_db[k] = to_decibels(*smoothed);
        }

        tracing::trace!(buffered = self.samples.len(), "spectrum analysed");
    }

    /// Push a block and analyse in one call
    pub fn process(&mut self, samples: &[f32]) {
        self.push_samples(samples);
        self.analyse();
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Center frequency of bin `k` in Hz
    pub fn bin_frequency(&self, k: usize) -> f32 {
        k as f32 * self.sample_rate as f32 / self.fft_size as f32
    }

    /// Drop buffered audio and smoothing state
    pub fn reset(&mut self) {
        self.samples.clear();
        self.smoothed_magnitudes.iter_mut().for_each(|m| *m = 0.0);
        self.frequency_db.iter_mut().for_each(|db| *db = MIN_DB);
        self.time_domain.iter_mut().for_each(|s| *s = 0.0);
    }
}

impl CaptureSource for SpectrumAnalyser {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn snapshot(&self) -> CaptureFrame<'_> {
        CaptureFrame {
            frequency_db: &self.frequency_db,
            time_domain: &self.time_domain,
            sample_rate: self.sample_rate,
        }
    }
}

impl fmt::Debug for SpectrumAnalyser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumAnalyser")
            .field("fft_size", &self.fft_size)
            .field("sample_rate", &self.sample_rate)
            .field("smoothing_time_constant", &self.smoothing_time_constant)
            .field("buffered", &self.samples.len())
            .finish()
    }
}

fn blackman_window(size: usize) -> Vec<f32> {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;
    let n = size as f32;
    (0..size)
        .map(|i| {
            let x = 2.0 * std::f32::consts::PI * i as f32 / n;
            A0 - A1 * x.cos() + A2 * (2.0 * x).cos()
        })
        .collect()
}

fn to_decibels(magnitude: f32) -> f32 {
    if magnitude > 0.0 {
        (20.0 * magnitude.log10()).max(MIN_DB)
    } else {
        MIN_DB
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{generate_sine_wave, generate_white_noise};

    fn analyser(fft_size: usize, smoothing: f32) -> SpectrumAnalyser {
        let config = AudioConfig {
            fft_size,
            smoothing_time_constant: smoothing,
            ..AudioConfig::default()
        };
        SpectrumAnalyser::new(44100, &config).unwrap()
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let config = AudioConfig {
            fft_size: 1000,
            ..AudioConfig::default()
        };
        assert_eq!(
            SpectrumAnalyser::new(44100, &config).unwrap_err(),
            ConfigError::InvalidFftSize { size: 1000 }
        );

        let config = AudioConfig {
            fft_size: 16,
            ..AudioConfig::default()
        };
        assert!(SpectrumAnalyser::new(44100, &config).is_err());
        assert!(SpectrumAnalyser::new(0, &AudioConfig::default()).is_err());
    }

    #[test]
    fn test_fresh_analyser_reports_silence() {
        let analyser = analyser(2048, 0.8);
        let frame = analyser.snapshot();
        assert_eq!(frame.frequency_db.len(), 1024);
        assert_eq!(frame.time_domain.len(), 2048);
        assert!(frame.frequency_db.iter().all(|&db| db == MIN_DB));
        assert_eq!(frame.sample_rate, 44100);
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let mut analyser = analyser(2048, 0.0);
        analyser.process(&generate_sine_wave(44100, 1000.0, 2048, 0.5));

        let frame = analyser.snapshot();
        let (peak_bin, peak_db) = frame
            .frequency_db
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (k, db)| if db > best.1 { (k, db) } else { best });

        let expected_bin = (1000.0 / analyser.bin_frequency(1)).round() as usize;
        assert!(
            (peak_bin as i64 - expected_bin as i64).abs() <= 1,
            "peak at bin {} ({} Hz), expected {}",
            peak_bin,
            analyser.bin_frequency(peak_bin),
            expected_bin
        );
        // 0.5 amplitude · 0.42 coherent gain / 2 ≈ -19.6 dB
        assert!(peak_db > -25.0 && peak_db < -15.0, "peak {} dB", peak_db);
    }

    #[test]
    fn test_time_domain_keeps_latest_window() {
        let mut analyser = analyser(32, 0.8);
        let ramp: Vec<f32> = (0..40).map(|i| i as f32 / 100.0).collect();
        analyser.process(&ramp);

        let frame = analyser.snapshot();
        assert_eq!(frame.time_domain.len(), 32);
        assert_eq!(frame.time_domain[0], 0.08);
        assert_eq!(frame.time_domain[31], 0.39);
    }

    #[test]
    fn test_partial_window_is_zero_filled_at_front() {
        let mut analyser = analyser(32, 0.8);
        analyser.process(&[0.5; 8]);
        let frame = analyser.snapshot();
        assert!(frame.time_domain[..24].iter().all(|&s| s == 0.0));
        assert!(frame.time_domain[24..].iter().all(|&s| s == 0.5));
    }

    #[test]
    fn test_smoothing_slows_decay() {
        let mut fast = analyser(256, 0.0);
        let mut slow = analyser(256, 0.9);
        let noise = generate_white_noise(256, 0.8);
        fast.process(&noise);
        slow.process(&noise);

        let silence = vec![0.0; 256];
        fast.process(&silence);
        slow.process(&silence);

        let fast_max = fast.snapshot().frequency_db.iter().copied().fold(MIN_DB, f32::max);
        let slow_max = slow.snapshot().frequency_db.iter().copied().fold(MIN_DB, f32::max);
        assert_eq!(fast_max, MIN_DB);
        assert!(slow_max > MIN_DB);
    }

    #[test]
    fn test_reset() {
        let mut analyser = analyser(64, 0.5);
        analyser.process(&generate_white_noise(64, 1.0));
        analyser.reset();
        let frame = analyser.snapshot();
        assert!(frame.frequency_db.iter().all(|&db| db == MIN_DB));
        assert!(frame.time_domain.iter().all(|&s| s == 0.0));
    }
}
