// Mapping module - features to visual parameters
//
// Three independent channels turn one frame of features into targets:
// - ColorChannel: emotion -> palette
// - ShapeChannel: volume + pitch -> bar geometry
// - DynamicChannel: speed + volume -> motion
// The UnifiedInterpolator then eases the current visuals toward them.

pub mod color;
pub mod dynamic;
pub mod interpolator;
pub mod presets;
pub mod shape;
pub mod types;

pub use color::ColorChannel;
pub use dynamic::{builtin_modulation, DynamicChannel, PatternModulator};
pub use interpolator::{UnifiedInterpolator, VisualParams};
pub use presets::{EmotionColorPreset, PresetRegistry, BUILT_IN_PRESETS};
pub use shape::ShapeChannel;
pub use types::{
    ColorParams, DynamicParams, ShapeParams, SpacingMode, ValueRange, WavePattern, DEFAULT_COLOR,
};
