// ColorChannel - emotion to HSL palette
//
// The preset of the current emotion sets the hues. Arousal pushes saturation
// and lightness up so a more activated voice reads as a more vivid palette.

use super::presets::{EmotionColorPreset, PresetRegistry};
use super::types::{ColorParams, DEFAULT_COLOR};
use crate::analysis::{EmotionData, EmotionType};
use crate::util::{blend, Hsl};

#[derive(Debug, Clone, Default)]
pub struct ColorChannel {
    registry: PresetRegistry,
}

impl ColorChannel {
    pub fn new(registry: PresetRegistry) -> Self {
        Self { registry }
    }

    /// Map an emotion to a palette
    ///
    /// Unknown emotions fall back to the neutral preset and then to the
    /// default palette. Fallbacks are returned without arousal adjustment.
    pub fn map(&self, emotion: &EmotionData) -> ColorParams {
        let Some(preset) = self.registry.get_emotion(emotion.emotion) else {
            return self
                .registry
                .get_emotion(EmotionType::Neutral)
                .map(palette_of)
                .unwrap_or(DEFAULT_COLOR);
        };

        let arousal = emotion.arousal;
        ColorParams {
            primary: excite(&preset.primary, arousal * 10.0, arousal * 5.0),
            secondary: excite(&preset.secondary, arousal * 8.0, arousal * 5.0),
            glow: excite(&preset.glow, arousal * 5.0, arousal * 5.0),
        }
    }

    /// Blend the palettes of several emotions by weight
    ///
    /// Emotions without a preset and non-positive weights are skipped. With
    /// nothing left every color falls back to `hsl(0, 0%, 50%)`.
    pub fn map_blended(&self, weights: &[(EmotionType, f32)]) -> ColorParams {
        let palettes: Vec<(ColorParams, f32)> = weights
            .iter()
            .filter(|(_, weight)| *weight > 0.0)
            .filter_map(|(emotion, weight)| {
                self.registry
                    .get_emotion(*emotion)
                    .map(|preset| (palette_of(preset), *weight))
            })
            .collect();

        let layer = |pick: fn(&ColorParams) -> Hsl| -> Hsl {
            let colors: Vec<(Hsl, f32)> = palettes.iter().map(|(p, w)| (pick(p), *w)).collect();
            blend(&colors)
        };

        ColorParams {
            primary: layer(|p| p.primary),
            secondary: layer(|p| p.secondary),
            glow: layer(|p| p.glow),
        }
    }

    /// Add or replace a preset in this channel's registry
    pub fn register_preset(&mut self, name: impl Into<String>, preset: EmotionColorPreset) {
        self.registry.register(name, preset);
    }

    pub fn presets(&self) -> &PresetRegistry {
        &self.registry
    }

    pub fn preset(&self, emotion: EmotionType) -> Option<&EmotionColorPreset> {
        self.registry.get_emotion(emotion)
    }
}

fn palette_of(preset: &EmotionColorPreset) -> ColorParams {
    ColorParams {
        primary: preset.primary,
        secondary: preset.secondary,
        glow: preset.glow,
    }
}

fn excite(color: &Hsl, saturation_boost: f32, lightness_boost: f32) -> Hsl {
    Hsl {
        hue: color.hue,
        saturation: (color.saturation + saturation_boost).clamp(0.0, 100.0),
        lightness: (color.lightness + lightness_boost).clamp(0.0, 100.0),
    }
}
