// HSL color helpers
//
// Hue is in degrees [0, 360), saturation and lightness are percentages
// [0, 100]. Hue arithmetic always goes around the color wheel.

use serde::{Deserialize, Serialize};

use super::math::lerp as lerp_f32;

/// A color in HSL space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

/// Wrap a hue in degrees into [0, 360)
pub fn wrap_hue(hue: f32) -> f32 {
    let wrapped = hue.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

impl Hsl {
    /// Build a color, wrapping the hue and clamping saturation/lightness.
    pub fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self {
            hue: wrap_hue(hue),
            saturation: saturation.clamp(0.0, 100.0),
            lightness: lightness.clamp(0.0, 100.0),
        }
    }

    /// CSS `hsl(...)` representation
    pub fn to_css(&self) -> String {
        format!(
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }

    /// CSS `hsla(...)` representation with alpha clamped to [0, 1]
    pub fn to_css_alpha(&self, alpha: f32) -> String {
        format!(
            "hsla({}, {}%, {}%, {})",
            self.hue,
            self.saturation,
            self.lightness,
            alpha.clamp(0.0, 1.0)
        )
    }

    pub fn adjust_lightness(&self, delta: f32) -> Self {
        Self {
            lightness: (self.lightness + delta).clamp(0.0, 100.0),
            ..*self
        }
    }

    pub fn adjust_saturation(&self, delta: f32) -> Self {
        Self {
            saturation: (self.saturation + delta).clamp(0.0, 100.0),
            ..*self
        }
    }

    /// Interpolate toward `target`, moving the hue along the shortest arc.
    ///
    /// # Arguments
    /// * `target` - Color to move toward
    /// * `t` - Blend factor, clamped to [0, 1]
    pub fn lerp(&self, target: &Hsl, t: f32) -> Self {
        let mut hue_diff = target.hue - self.hue;
        if hue_diff > 180.0 {
            hue_diff -= 360.0;
        }
        if hue_diff < -180.0 {
            hue_diff += 360.0;
        }

        Self {
            hue: wrap_hue(self.hue + hue_diff * t.clamp(0.0, 1.0)),
            saturation: lerp_f32(self.saturation, target.saturation, t),
            lightness: lerp_f32(self.lightness, target.lightness, t),
        }
    }
}

/// Weighted blend of several colors.
///
/// Hue uses the circular mean (vector sum of unit hue angles) so that
/// 350° and 10° blend to 0° instead of 180°. Saturation and lightness are
/// weighted arithmetic means. No colors, or a zero total weight, yields
/// `hsl(0, 0, 50)`.
pub fn blend(colors: &[(Hsl, f32)]) -> Hsl {
    let fallback = Hsl::new(0.0, 0.0, 50.0);
    if colors.is_empty() {
        return fallback;
    }

    let mut total_weight = 0.0f32;
    let mut hue_x = 0.0f32;
    let mut hue_y = 0.0f32;
    let mut saturation = 0.0f32;
    let mut lightness = 0.0f32;

    for (color, weight) in colors {
        total_weight += weight;
        let hue_rad = color.hue.to_radians();
        hue_x += hue_rad.cos() * weight;
        hue_y += hue_rad.sin() * weight;
        saturation += color.saturation * weight;
        lightness += color.lightness * weight;
    }

    if total_weight == 0.0 {
        return fallback;
    }

    let avg_hue = (hue_y / total_weight).atan2(hue_x / total_weight).to_degrees();

    Hsl {
        hue: wrap_hue(avg_hue),
        saturation: (saturation / total_weight).clamp(0.0, 100.0),
        lightness: (lightness / total_weight).clamp(0.0, 100.0),
    }
}
