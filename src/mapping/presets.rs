// Presets module - per-emotion visual baselines
//
// The built-in table is a process-wide constant. Every channel or engine that
// needs presets owns a PresetRegistry copied from it; registration only ever
// touches that copy.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{SpacingMode, ValueRange, WavePattern};
use crate::analysis::EmotionType;
use crate::util::Hsl;

/// Visual baseline applied when an emotion becomes current
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionColorPreset {
    pub primary: Hsl,
    pub secondary: Hsl,
    pub glow: Hsl,
    /// Output range of the shape channel's amplitude mapping
    pub amplitude_range: ValueRange,
    pub speed_multiplier: f32,
    pub spacing_mode: SpacingMode,
    pub wave_pattern: WavePattern,
    pub glow_intensity: f32,
}

#[allow(clippy::too_many_arguments)]
fn preset(
    primary: (f32, f32, f32),
    secondary: (f32, f32, f32),
    glow: (f32, f32, f32),
    amplitude_range: (f32, f32),
    speed_multiplier: f32,
    spacing_mode: SpacingMode,
    wave_pattern: WavePattern,
    glow_intensity: f32,
) -> EmotionColorPreset {
    EmotionColorPreset {
        primary: Hsl::new(primary.0, primary.1, primary.2),
        secondary: Hsl::new(secondary.0, secondary.1, secondary.2),
        glow: Hsl::new(glow.0, glow.1, glow.2),
        amplitude_range: ValueRange::new(amplitude_range.0, amplitude_range.1),
        speed_multiplier,
        spacing_mode,
        wave_pattern,
        glow_intensity,
    }
}

/// Built-in presets for the six emotions
pub static BUILT_IN_PRESETS: Lazy<BTreeMap<EmotionType, EmotionColorPreset>> = Lazy::new(|| {
    BTreeMap::from([
        (
            EmotionType::Happy,
            preset(
                (180.0, 90.0, 85.0),
                (170.0, 80.0, 75.0),
                (180.0, 100.0, 90.0),
                (0.8, 1.0),
                1.2,
                SpacingMode::Tight,
                WavePattern::Active,
                0.8,
            ),
        ),
        (
            EmotionType::Sad,
            preset(
                (270.0, 60.0, 55.0),
                (280.0, 50.0, 45.0),
                (270.0, 70.0, 60.0),
                (0.3, 0.6),
                0.6,
                SpacingMode::Sparse,
                WavePattern::Slow,
                0.3,
            ),
        ),
        (
            EmotionType::Calm,
            preset(
                (0.0, 10.0, 70.0),
                (0.0, 5.0, 60.0),
                (0.0, 15.0, 80.0),
                (0.1, 0.3),
                0.4,
                SpacingMode::Uniform,
                WavePattern::Breathing,
                0.1,
            ),
        ),
        (
            EmotionType::Angry,
            preset(
                (0.0, 95.0, 60.0),
                (10.0, 90.0, 50.0),
                (0.0, 100.0, 70.0),
                (0.9, 1.0),
                1.5,
                SpacingMode::Irregular,
                WavePattern::Shaking,
                1.0,
            ),
        ),
        (
            EmotionType::Excited,
            preset(
                (60.0, 85.0, 80.0),
                (50.0, 80.0, 70.0),
                (60.0, 90.0, 85.0),
                (0.7, 1.0),
                1.8,
                SpacingMode::Jumping,
                WavePattern::Pulsing,
                0.9,
            ),
        ),
        (
            EmotionType::Neutral,
            preset(
                (210.0, 30.0, 50.0),
                (220.0, 25.0, 40.0),
                (210.0, 35.0, 55.0),
                (0.2, 0.4),
                0.8,
                SpacingMode::Uniform,
                WavePattern::Breathing,
                0.2,
            ),
        ),
    ])
});

/// Owned preset table keyed by identifier
///
/// Starts as a copy of [`BUILT_IN_PRESETS`] keyed by the emotions' names.
/// Registering under an existing name replaces that entry for this registry
/// only.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetRegistry {
    presets: BTreeMap<String, EmotionColorPreset>,
}

impl PresetRegistry {
    pub fn new() -> Self {
        let presets = BUILT_IN_PRESETS
            .iter()
            .map(|(emotion, preset)| (emotion.as_str().to_string(), *preset))
            .collect();
        Self { presets }
    }

    /// Build a registry from an explicit table, without the built-ins
    pub fn from_presets(presets: BTreeMap<String, EmotionColorPreset>) -> Self {
        Self { presets }
    }

    /// Add or replace a preset
    pub fn register(&mut self, name: impl Into<String>, preset: EmotionColorPreset) {
        self.presets.insert(name.into(), preset);
    }

    pub fn get(&self, name: &str) -> Option<&EmotionColorPreset> {
        self.presets.get(name)
    }

    pub fn get_emotion(&self, emotion: EmotionType) -> Option<&EmotionColorPreset> {
        self.get(emotion.as_str())
    }

    /// Read-only view of every registered preset
    pub fn presets(&self) -> &BTreeMap<String, EmotionColorPreset> {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::new()
    }
}
