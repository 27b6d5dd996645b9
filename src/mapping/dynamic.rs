// DynamicChannel - speaking rate and loudness to motion
//
// Faster speech animates faster and transitions quicker; louder peaks glow
// brighter. The wave pattern comes from the last applied emotion preset and
// is turned into an amplitude envelope by its modulator.

use rand::Rng;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::presets::EmotionColorPreset;
use super::types::{DynamicParams, ValueRange, WavePattern};
use crate::analysis::{SpeedData, VolumeData};
use crate::util::math::map_range;

/// Glow gain applied to the volume peak
const GLOW_GAIN: f32 = 1.2;

/// Amplitude modulation `f(phase, base_amplitude) -> amplitude`
pub type PatternModulator = Arc<dyn Fn(f32, f32) -> f32 + Send + Sync>;

/// Built-in envelope of a wave pattern at `phase` (seconds of animation)
pub fn builtin_modulation(pattern: WavePattern, phase: f32, base_amplitude: f32) -> f32 {
    match pattern {
        WavePattern::Steady => base_amplitude,
        WavePattern::Active => base_amplitude * (0.8 + 0.2 * (phase * 8.0).sin()),
        WavePattern::Slow => base_amplitude * (0.7 + 0.3 * (phase * 2.0).sin()),
        WavePattern::Shaking => {
            let jitter: f32 = rand::thread_rng().gen_range(0.0..0.5);
            base_amplitude * (0.6 + 0.4 * (phase * 15.0 + jitter).sin())
        }
        WavePattern::Pulsing => base_amplitude * (0.5 + 0.5 * (phase * 6.0).sin().abs()),
        WavePattern::Breathing => base_amplitude * (0.8 + 0.2 * (phase * 1.5).sin()),
    }
}

#[derive(Clone)]
pub struct DynamicChannel {
    speed_range: ValueRange,
    transition_range: ValueRange,
    current_pattern: WavePattern,
    preset_speed_multiplier: f32,
    custom_patterns: HashMap<WavePattern, PatternModulator>,
}

impl DynamicChannel {
    /// # Arguments
    /// * `speed_range` - Speed multiplier at zero and full activity
    /// * `transition_range` - Transition duration range in ms; full activity
    ///   maps to `min`, silence to `max`
    pub fn new(speed_range: ValueRange, transition_range: ValueRange) -> Self {
        Self {
            speed_range,
            transition_range,
            current_pattern: WavePattern::Breathing,
            preset_speed_multiplier: 0.8,
            custom_patterns: HashMap::new(),
        }
    }

    pub fn map(&self, speed: &SpeedData, volume: &VolumeData) -> DynamicParams {
        let speed_multiplier = map_range(
            speed.activity_rate,
            0.0,
            1.0,
            self.speed_range.min,
            self.speed_range.max,
        );

        let transition_duration = map_range(
            speed.activity_rate,
            0.0,
            1.0,
            self.transition_range.max,
            self.transition_range.min,
        );

        DynamicParams {
            speed_multiplier: self.speed_range.clamp(speed_multiplier),
            wave_pattern: self.current_pattern,
            glow_intensity: (volume.peak * GLOW_GAIN).clamp(0.0, 1.0),
            transition_duration,
        }
    }

    /// Envelope of `pattern`, using a registered replacement when present
    pub fn modulate(&self, pattern: WavePattern, phase: f32, base_amplitude: f32) -> f32 {
        match self.custom_patterns.get(&pattern) {
            Some(modulator) => modulator(phase, base_amplitude),
            None => builtin_modulation(pattern, phase, base_amplitude),
        }
    }

    /// Replace the modulator of a pattern for this channel
    pub fn register_pattern(&mut self, pattern: WavePattern, modulator: PatternModulator) {
        self.custom_patterns.insert(pattern, modulator);
    }

    /// Adopt the wave pattern and base speed of a preset
    pub fn apply_emotion_preset(&mut self, preset: &EmotionColorPreset) {
        self.current_pattern = preset.wave_pattern;
        self.preset_speed_multiplier = preset.speed_multiplier;
    }

    pub fn set_speed_range(&mut self, range: ValueRange) {
        self.speed_range = range;
    }

    pub fn current_pattern(&self) -> WavePattern {
        self.current_pattern
    }

    /// Speed multiplier carried by the last applied preset
    pub fn preset_speed_multiplier(&self) -> f32 {
        self.preset_speed_multiplier
    }
}

impl Default for DynamicChannel {
    fn default() -> Self {
        Self::new(ValueRange::new(0.4, 1.8), ValueRange::new(200.0, 800.0))
    }
}

impl fmt::Debug for DynamicChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut custom: Vec<&WavePattern> = self.custom_patterns.keys().collect();
        custom.sort_by_key(|pattern| format!("{:?}", pattern));
        f.debug_struct("DynamicChannel")
            .field("speed_range", &self.speed_range)
            .field("transition_range", &self.transition_range)
            .field("current_pattern", &self.current_pattern)
            .field("preset_speed_multiplier", &self.preset_speed_multiplier)
            .field("custom_patterns", &custom)
            .finish()
    }
}
