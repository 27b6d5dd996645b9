// Types module - per-frame feature records
//
// Every record is plain data produced once per frame. Normalized fields are
// clamped by the extractor that produces them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Loudness features derived from the frequency buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeData {
    /// RMS of the normalized bins for this frame (0.0-1.0)
    pub rms: f32,
    /// Peak envelope: instant attack, slow release (0.0-1.0)
    pub peak: f32,
    /// EMA-smoothed RMS carried across frames (0.0-1.0)
    pub smoothed: f32,
}

/// Fundamental frequency estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchData {
    /// Fundamental in Hz, 0.0 when no pitch was detected
    pub frequency: f32,
    /// Detection confidence (0.0-1.0)
    pub confidence: f32,
    /// Frequency change in Hz per second since the previous frame
    pub change_rate: f32,
}

/// Speech activity features from the voice-activity detector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedData {
    /// Fraction of active frames in the trailing window (0.0-1.0)
    pub activity_rate: f32,
    /// Activity rate change per second
    pub change_rate: f32,
    /// Whether the current frame was classified as speech
    pub is_active: bool,
}

/// The six emotions of the arousal-valence model
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EmotionType {
    Happy,
    Sad,
    Calm,
    Angry,
    Excited,
    #[default]
    Neutral,
}

impl EmotionType {
    pub const ALL: [EmotionType; 6] = [
        EmotionType::Happy,
        EmotionType::Sad,
        EmotionType::Calm,
        EmotionType::Angry,
        EmotionType::Excited,
        EmotionType::Neutral,
    ];

    /// Registry key of this emotion
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionType::Happy => "happy",
            EmotionType::Sad => "sad",
            EmotionType::Calm => "calm",
            EmotionType::Angry => "angry",
            EmotionType::Excited => "excited",
            EmotionType::Neutral => "neutral",
        }
    }
}

impl fmt::Display for EmotionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmotionType::ALL
            .iter()
            .copied()
            .find(|emotion| emotion.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown emotion '{}'", s))
    }
}

/// Classified emotion with its position in arousal-valence space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionData {
    #[serde(rename = "type")]
    pub emotion: EmotionType,
    /// 1 - distance to the region center, clamped (0.0-1.0)
    pub confidence: f32,
    /// Smoothed activation (0.0-1.0)
    pub arousal: f32,
    /// Smoothed pleasantness (-1.0-1.0)
    pub valence: f32,
}

impl Default for EmotionData {
    fn default() -> Self {
        Self {
            emotion: EmotionType::Neutral,
            confidence: 1.0,
            arousal: 0.3,
            valence: 0.0,
        }
    }
}

/// Four-dimensional feature vector produced once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub volume: VolumeData,
    pub pitch: PitchData,
    pub speed: SpeedData,
    pub emotion: EmotionData,
    /// Smoothed band energies (0.0-1.0), one per configured band
    pub bands: Vec<f32>,
    /// Frame timestamp in milliseconds
    pub timestamp_ms: f64,
}
