// UnifiedInterpolator - frame-rate independent smoothing of all channels
//
// Each frame moves every numeric parameter a fraction t = 1 - e^(-speed·dt)
// of the way toward its target, so the visual result depends on elapsed time
// and not on how many frames were drawn. Hues travel the short way around
// the wheel. Categorical modes switch only once t exceeds 0.5.

use serde::{Deserialize, Serialize};

use super::types::{ColorParams, DynamicParams, ShapeParams};
use crate::util::math::{lerp, time_lerp_factor};

/// Lowest accepted interpolation speed
const MIN_LERP_SPEED: f32 = 0.01;

/// Blend factor above which categorical fields adopt the target
const CATEGORICAL_SWITCH: f32 = 0.5;

/// Interpolated output of the three channels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualParams {
    pub color: ColorParams,
    pub shape: ShapeParams,
    pub dynamic: DynamicParams,
}

#[derive(Debug, Clone)]
pub struct UnifiedInterpolator {
    current: VisualParams,
    // Kept unrounded so small steps accumulate instead of rounding away
    active_count: f32,
    lerp_speed: f32,
}

impl UnifiedInterpolator {
    pub fn new(lerp_speed: f32) -> Self {
        let current = VisualParams::default();
        Self {
            active_count: current.shape.active_count as f32,
            current,
            lerp_speed: lerp_speed.max(MIN_LERP_SPEED),
        }
    }

    /// Advance toward the targets by `dt_ms` of animation time
    ///
    /// # Returns
    /// The new current values
    pub fn interpolate(
        &mut self,
        color: &ColorParams,
        shape: &ShapeParams,
        dynamic: &DynamicParams,
        dt_ms: f32,
    ) -> VisualParams {
        let t = time_lerp_factor(self.lerp_speed, dt_ms.max(0.0));
        let switch = t > CATEGORICAL_SWITCH;

        let current = &mut self.current;
        current.color = ColorParams {
            primary: current.color.primary.lerp(&color.primary, t),
            secondary: current.color.secondary.lerp(&color.secondary, t),
            glow: current.color.glow.lerp(&color.glow, t),
        };

        self.active_count = lerp(self.active_count, shape.active_count as f32, t);
        current.shape = ShapeParams {
            amplitude: lerp(current.shape.amplitude, shape.amplitude, t),
            spacing: lerp(current.shape.spacing, shape.spacing, t),
            active_count: self.active_count.round().max(0.0) as usize,
            variance: lerp(current.shape.variance, shape.variance, t),
            spacing_mode: if switch {
                shape.spacing_mode
            } else {
                current.shape.spacing_mode
            },
        };

        current.dynamic = DynamicParams {
            speed_multiplier: lerp(current.dynamic.speed_multiplier, dynamic.speed_multiplier, t),
            wave_pattern: if switch {
                dynamic.wave_pattern
            } else {
                current.dynamic.wave_pattern
            },
            glow_intensity: lerp(current.dynamic.glow_intensity, dynamic.glow_intensity, t),
            transition_duration: lerp(
                current.dynamic.transition_duration,
                dynamic.transition_duration,
                t,
            ),
        };

        *current
    }

    /// Jump straight to the given values
    pub fn snap(&mut self, color: &ColorParams, shape: &ShapeParams, dynamic: &DynamicParams) {
        self.current = VisualParams {
            color: *color,
            shape: *shape,
            dynamic: *dynamic,
        };
        self.active_count = shape.active_count as f32;
    }

    pub fn current(&self) -> VisualParams {
        self.current
    }

    /// Set the interpolation speed (floored at 0.01)
    pub fn set_lerp_speed(&mut self, speed: f32) {
        self.lerp_speed = speed.max(MIN_LERP_SPEED);
    }

    pub fn lerp_speed(&self) -> f32 {
        self.lerp_speed
    }
}

impl Default for UnifiedInterpolator {
    fn default() -> Self {
        Self::new(5.0)
    }
}
