// Types module - channel outputs and categorical visual modes

use serde::{Deserialize, Serialize};

use crate::util::Hsl;

/// Inclusive numeric range used by channel mappings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) / 2.0
    }

    /// Clamp a value into the range regardless of min/max order
    pub fn clamp(&self, value: f32) -> f32 {
        let (low, high) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        value.clamp(low, high)
    }
}

/// How bars are spread across the waveform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacingMode {
    #[default]
    Uniform,
    Tight,
    Sparse,
    Irregular,
    Jumping,
}

/// Amplitude modulation applied over time by the renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WavePattern {
    Steady,
    Active,
    Slow,
    Shaking,
    Pulsing,
    #[default]
    Breathing,
}

impl WavePattern {
    pub const ALL: [WavePattern; 6] = [
        WavePattern::Steady,
        WavePattern::Active,
        WavePattern::Slow,
        WavePattern::Shaking,
        WavePattern::Pulsing,
        WavePattern::Breathing,
    ];
}

/// Color channel output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorParams {
    pub primary: Hsl,
    pub secondary: Hsl,
    pub glow: Hsl,
}

/// Neutral palette used before any preset is known
pub const DEFAULT_COLOR: ColorParams = ColorParams {
    primary: Hsl {
        hue: 210.0,
        saturation: 30.0,
        lightness: 50.0,
    },
    secondary: Hsl {
        hue: 220.0,
        saturation: 25.0,
        lightness: 40.0,
    },
    glow: Hsl {
        hue: 210.0,
        saturation: 35.0,
        lightness: 55.0,
    },
};

impl Default for ColorParams {
    fn default() -> Self {
        DEFAULT_COLOR
    }
}

/// Shape channel output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeParams {
    /// Bar height scale (0.0-1.0)
    pub amplitude: f32,
    /// Gap between bars
    pub spacing: f32,
    /// Number of bars drawn as active
    pub active_count: usize,
    /// Height variation between bars (0.0-1.0)
    pub variance: f32,
    pub spacing_mode: SpacingMode,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            amplitude: 0.3,
            spacing: 5.0,
            active_count: 12,
            variance: 0.2,
            spacing_mode: SpacingMode::Uniform,
        }
    }
}

/// Dynamic channel output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicParams {
    pub speed_multiplier: f32,
    pub wave_pattern: WavePattern,
    /// Glow strength (0.0-1.0)
    pub glow_intensity: f32,
    /// Suggested transition length in milliseconds
    pub transition_duration: f32,
}

impl Default for DynamicParams {
    fn default() -> Self {
        Self {
            speed_multiplier: 0.8,
            wave_pattern: WavePattern::Breathing,
            glow_intensity: 0.2,
            transition_duration: 500.0,
        }
    }
}
