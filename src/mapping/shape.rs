// ShapeChannel - volume and pitch to static bar geometry
//
// Mappings:
// - amplitude    <- volume.smoothed through the preset's amplitude range
// - spacing      <- pitch height (higher voice, tighter bars)
// - active_count <- volume.peak, between 30% of the bars and all of them
// - variance     <- |pitch change rate|

use super::presets::EmotionColorPreset;
use super::types::{ShapeParams, SpacingMode, ValueRange};
use crate::analysis::{PitchData, VolumeData};
use crate::util::math::map_range;

/// Pitch band mapped across the spacing range, in Hz
const SPACING_PITCH_LOW: f32 = 80.0;
const SPACING_PITCH_HIGH: f32 = 600.0;

/// Pitch confidence needed before pitch shapes the bars
const PITCH_CONFIDENCE_GATE: f32 = 0.5;

/// Variance reported while no reliable pitch is present
const FALLBACK_VARIANCE: f32 = 0.2;

/// Change rate in Hz/s that maps to full variance
const VARIANCE_FULL_SCALE: f32 = 200.0;

#[derive(Debug, Clone)]
pub struct ShapeChannel {
    amplitude_range: ValueRange,
    spacing_range: ValueRange,
    bar_count: usize,
    spacing_mode: SpacingMode,
}

impl ShapeChannel {
    pub fn new(amplitude_range: ValueRange, spacing_range: ValueRange, bar_count: usize) -> Self {
        Self {
            amplitude_range,
            spacing_range,
            bar_count: bar_count.max(1),
            spacing_mode: SpacingMode::Uniform,
        }
    }

    pub fn map(&self, volume: &VolumeData, pitch: &PitchData) -> ShapeParams {
        let amplitude = map_range(
            volume.smoothed,
            0.0,
            1.0,
            self.amplitude_range.min,
            self.amplitude_range.max,
        )
        .clamp(0.0, 1.0);

        let voiced = pitch.frequency > 0.0 && pitch.confidence > PITCH_CONFIDENCE_GATE;
        let spacing = if voiced {
            map_range(
                pitch.frequency.clamp(SPACING_PITCH_LOW, SPACING_PITCH_HIGH),
                SPACING_PITCH_LOW,
                SPACING_PITCH_HIGH,
                self.spacing_range.max,
                self.spacing_range.min,
            )
        } else {
            self.spacing_range.midpoint()
        };

        let min_active = (self.bar_count as f32 * 0.3).floor();
        let active_count = map_range(volume.peak, 0.0, 1.0, min_active, self.bar_count as f32)
            .round()
            .max(0.0) as usize;

        let variance = if pitch.confidence > PITCH_CONFIDENCE_GATE {
            (pitch.change_rate.abs() / VARIANCE_FULL_SCALE).clamp(0.0, 1.0)
        } else {
            FALLBACK_VARIANCE
        };

        ShapeParams {
            amplitude,
            spacing,
            active_count,
            variance,
            spacing_mode: self.spacing_mode,
        }
    }

    /// Adopt the amplitude range and spacing mode of a preset
    pub fn apply_emotion_preset(&mut self, preset: &EmotionColorPreset) {
        self.amplitude_range = preset.amplitude_range;
        self.spacing_mode = preset.spacing_mode;
    }

    pub fn set_amplitude_range(&mut self, range: ValueRange) {
        self.amplitude_range = range;
    }

    pub fn set_spacing_range(&mut self, range: ValueRange) {
        self.spacing_range = range;
    }

    /// Set the number of bars (at least 1)
    pub fn set_bar_count(&mut self, count: usize) {
        self.bar_count = count.max(1);
    }

    pub fn amplitude_range(&self) -> ValueRange {
        self.amplitude_range
    }

    pub fn spacing_mode(&self) -> SpacingMode {
        self.spacing_mode
    }

    pub fn bar_count(&self) -> usize {
        self.bar_count
    }
}

impl Default for ShapeChannel {
    fn default() -> Self {
        Self::new(ValueRange::new(0.0, 1.0), ValueRange::new(1.0, 10.0), 24)
    }
}
