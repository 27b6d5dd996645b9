// SpeedExtractor - energy-based voice activity over a sliding window
//
// A frame is active when the mean normalized bin energy exceeds the
// threshold. The last `window_size` decisions are kept in a ring buffer and
// the active fraction of that buffer is the speaking rate.

use std::collections::VecDeque;

use super::types::SpeedData;
use crate::config::VadConfig;
use crate::error::ConfigError;
use crate::util::math::normalize_decibels;

#[derive(Debug, Clone)]
pub struct SpeedExtractor {
    threshold: f32,
    window_size: usize,
    min_db: f32,
    max_db: f32,
    history: VecDeque<bool>,
    last_activity_rate: f32,
    last_timestamp_ms: Option<f64>,
}

impl SpeedExtractor {
    /// Create a voice activity detector
    ///
    /// # Arguments
    /// * `config` - Energy threshold and window length
    /// * `min_db` / `max_db` - Analyser decibel window used for normalization
    ///
    /// # Errors
    /// `InvalidWindowSize` for a zero window, `InvalidDecibelRange` for an
    /// inverted dB window
    pub fn new(config: &VadConfig, min_db: f32, max_db: f32) -> Result<Self, ConfigError> {
        if config.window_size == 0 {
            return Err(ConfigError::InvalidWindowSize { size: 0 });
        }
        if !(min_db < max_db) {
            return Err(ConfigError::InvalidDecibelRange { min_db, max_db });
        }

        Ok(Self {
            threshold: config.threshold.clamp(0.0, 1.0),
            window_size: config.window_size,
            min_db,
            max_db,
            history: VecDeque::with_capacity(config.window_size),
            last_activity_rate: 0.0,
            last_timestamp_ms: None,
        })
    }

    /// Classify one frame and update the activity window
    ///
    /// An empty spectrum returns a zero result without touching the history.
    pub fn extract(&mut self, frequency_db: &[f32], now_ms: f64) -> SpeedData {
        if frequency_db.is_empty() {
            return SpeedData::default();
        }

        let energy = frequency_db
            .iter()
            .map(|&db| normalize_decibels(db, self.min_db, self.max_db).max(0.0))
            .sum::<f32>()
            / frequency_db.len() as f32;
        let is_active = energy > self.threshold;

        self.history.push_back(is_active);
        while self.history.len() > self.window_size {
            self.history.pop_front();
        }

        let activity_rate = self.activity_rate();
        let change_rate = match self.last_timestamp_ms {
            Some(last) if now_ms > last => {
                (activity_rate - self.last_activity_rate) / ((now_ms - last) / 1000.0) as f32
            }
            _ => 0.0,
        };

        self.last_activity_rate = activity_rate;
        self.last_timestamp_ms = Some(now_ms);

        SpeedData {
            activity_rate,
            change_rate,
            is_active,
        }
    }

    fn activity_rate(&self) -> f32 {
        if self.history.is_empty() {
            return 0.0;
        }
        let active = self.history.iter().filter(|&&active| active).count();
        (active as f32 / self.history.len() as f32).clamp(0.0, 1.0)
    }

    /// Set the energy threshold (clamped to [0, 1])
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold.clamp(0.0, 1.0);
    }

    /// Resize the activity window, dropping the oldest decisions if it shrinks
    pub fn set_window_size(&mut self, size: usize) -> Result<(), ConfigError> {
        if size == 0 {
            return Err(ConfigError::InvalidWindowSize { size });
        }
        self.window_size = size;
        while self.history.len() > size {
            self.history.pop_front();
        }
        Ok(())
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Reset internal state
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_activity_rate = 0.0;
        self.last_timestamp_ms = None;
    }
}
