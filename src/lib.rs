// Emotive Waveform Core - audio features to animated visual parameters
// Frame-driven pipeline: capture -> extractors -> emotion -> channels -> interpolator

// Module declarations
pub mod analysis;
pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod render;
pub mod util;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use analysis::{AudioFeatures, EmotionData, EmotionType, PitchData, SpeedData, VolumeData};
pub use audio::{CaptureFrame, CaptureSource, SpectrumAnalyser, WavCapture};
pub use config::AppConfig;
pub use engine::{EngineEvent, FrameData, WaveformEngine};
pub use error::{CaptureError, ConfigError, ErrorCode};
pub use mapping::{ColorParams, DynamicParams, EmotionColorPreset, ShapeParams, WavePattern};
pub use render::{AgentState, JsonLinesRenderer, Renderer};
