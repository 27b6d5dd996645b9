// Analysis module - per-frame feature extraction
//
// Each extractor owns its own smoothing state and is mutated only by the
// engine that holds it. Degenerate input (empty buffers, silence, no pitch)
// is answered with a zeroed record instead of an error.
//
// Pipeline:
// - VolumeExtractor, SpeedExtractor and MultibandProcessor read the
//   frequency-domain buffer (dB)
// - PitchExtractor reads the time-domain buffer (±1)
// - EmotionExtractor combines volume, pitch and speed

pub mod emotion;
pub mod multiband;
pub mod pitch;
pub mod speed;
pub mod types;
pub mod volume;

pub use emotion::{classify, region_for, EmotionExtractor, EmotionRegion, EMOTION_REGIONS};
pub use multiband::MultibandProcessor;
pub use pitch::{PitchAlgorithm, PitchExtractor};
pub use speed::SpeedExtractor;
pub use types::{AudioFeatures, EmotionData, EmotionType, PitchData, SpeedData, VolumeData};
pub use volume::VolumeExtractor;
