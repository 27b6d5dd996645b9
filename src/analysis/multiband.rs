// MultibandProcessor - power-law band aggregation for bar visualisation
//
// Band i covers bins [floor((i/B)^1.5 · N), floor(((i+1)/B)^1.5 · N)), which
// gives low frequencies narrow bands and high frequencies wide ones. Each
// band value is the mean normalized dB of its bins, smoothed per band.

use crate::error::ConfigError;
use crate::util::math::normalize_decibels;

/// Exponent of the bin distribution curve
const BAND_CURVE: f32 = 1.5;

#[derive(Debug, Clone)]
pub struct MultibandProcessor {
    band_count: usize,
    min_db: f32,
    max_db: f32,
    smoothing: f32,
    smoothed_bands: Vec<f32>,
}

impl MultibandProcessor {
    /// # Errors
    /// `InvalidBandCount` for zero bands, `InvalidDecibelRange` for an
    /// inverted dB window, `InvalidSmoothing` for a factor outside [0, 1]
    pub fn new(
        band_count: usize,
        min_db: f32,
        max_db: f32,
        smoothing: f32,
    ) -> Result<Self, ConfigError> {
        if band_count == 0 {
            return Err(ConfigError::InvalidBandCount { count: band_count });
        }
        if !(min_db < max_db) {
            return Err(ConfigError::InvalidDecibelRange { min_db, max_db });
        }
        if !(0.0..=1.0).contains(&smoothing) {
            return Err(ConfigError::InvalidSmoothing {
                name: "band smoothing",
                value: smoothing,
            });
        }

        Ok(Self {
            band_count,
            min_db,
            max_db,
            smoothing,
            smoothed_bands: vec![0.0; band_count],
        })
    }

    /// Aggregate a decibel spectrum into `band_count` smoothed values
    ///
    /// Spectra shorter than the band count are valid: bands whose bin range
    /// is empty read as 0 before smoothing. An empty spectrum returns zeros
    /// without touching the smoothed bands.
    pub fn process(&mut self, frequency_db: &[f32]) -> Vec<f32> {
        if frequency_db.is_empty() {
            return vec![0.0; self.band_count];
        }

        let total_bins = frequency_db.len();

        for band in 0..self.band_count {
            let (start, end) = band_bin_range(band, self.band_count, total_bins);
            let raw = if end > start {
                frequency_db[start..end]
                    .iter()
                    .map(|&db| normalize_decibels(db, self.min_db, self.max_db))
                    .sum::<f32>()
                    / (end - start) as f32
            } else {
                0.0
            };

            let smoothed = self.smoothing * self.smoothed_bands[band] + (1.0 - self.smoothing) * raw;
            self.smoothed_bands[band] = smoothed.clamp(0.0, 1.0);
        }

        self.smoothed_bands.clone()
    }

    /// Change the number of bands; all smoothing state is discarded
    pub fn set_band_count(&mut self, band_count: usize) -> Result<(), ConfigError> {
        if band_count == 0 {
            return Err(ConfigError::InvalidBandCount { count: band_count });
        }
        self.band_count = band_count;
        self.smoothed_bands = vec![0.0; band_count];
        Ok(())
    }

    pub fn band_count(&self) -> usize {
        self.band_count
    }

    /// Current smoothed values without processing a new frame
    pub fn bands(&self) -> &[f32] {
        &self.smoothed_bands
    }

    /// Reset internal state
    pub fn reset(&mut self) {
        self.smoothed_bands.iter_mut().for_each(|band| *band = 0.0);
    }
}

fn band_bin_range(band: usize, band_count: usize, total_bins: usize) -> (usize, usize) {
    let edge = |i: usize| {
        let position = (i as f32 / band_count as f32).powf(BAND_CURVE);
        ((position * total_bins as f32).floor() as usize).min(total_bins)
    };
    (edge(band), edge(band + 1))
}
