// EmotionExtractor - arousal/valence estimation and region classification
//
// This module maps the three low-level features onto the circumplex model:
// - Arousal: loudness, speaking rate and the presence of a clear pitch
// - Valence: pitch height relative to 200 Hz plus pitch movement
//
// Both axes are smoothed, then the nearest region center (Euclidean) names
// the emotion. A manual override bypasses detection entirely.

use super::types::{EmotionData, EmotionType, PitchData, SpeedData, VolumeData};

/// EMA factor applied to arousal and valence
const EMOTION_SMOOTHING: f32 = 0.9;

/// Pitch confidence above which pitch contributes to arousal and valence
const PITCH_CONFIDENCE_GATE: f32 = 0.5;

/// Reference pitch for neutral valence in Hz
const VALENCE_PITCH_CENTER: f32 = 200.0;

const INITIAL_AROUSAL: f32 = 0.3;
const INITIAL_VALENCE: f32 = 0.0;

/// Axis-aligned rectangle in arousal-valence space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionRegion {
    pub emotion: EmotionType,
    pub arousal: (f32, f32),
    pub valence: (f32, f32),
}

impl EmotionRegion {
    /// Midpoint of the rectangle as (arousal, valence)
    pub fn center(&self) -> (f32, f32) {
        (
            (self.arousal.0 + self.arousal.1) / 2.0,
            (self.valence.0 + self.valence.1) / 2.0,
        )
    }

    pub fn contains(&self, arousal: f32, valence: f32) -> bool {
        (self.arousal.0..=self.arousal.1).contains(&arousal)
            && (self.valence.0..=self.valence.1).contains(&valence)
    }
}

/// Region table in classification order; earlier rows win distance ties
pub const EMOTION_REGIONS: [EmotionRegion; 6] = [
    EmotionRegion {
        emotion: EmotionType::Happy,
        arousal: (0.4, 0.8),
        valence: (0.3, 0.8),
    },
    EmotionRegion {
        emotion: EmotionType::Excited,
        arousal: (0.7, 1.0),
        valence: (0.2, 1.0),
    },
    EmotionRegion {
        emotion: EmotionType::Angry,
        arousal: (0.7, 1.0),
        valence: (-1.0, -0.3),
    },
    EmotionRegion {
        emotion: EmotionType::Sad,
        arousal: (0.0, 0.4),
        valence: (-1.0, -0.2),
    },
    EmotionRegion {
        emotion: EmotionType::Calm,
        arousal: (0.0, 0.3),
        valence: (-0.2, 0.5),
    },
    EmotionRegion {
        emotion: EmotionType::Neutral,
        arousal: (0.2, 0.5),
        valence: (-0.2, 0.2),
    },
];

/// Look up the region of an emotion
pub fn region_for(emotion: EmotionType) -> &'static EmotionRegion {
    EMOTION_REGIONS
        .iter()
        .find(|region| region.emotion == emotion)
        .unwrap_or(&EMOTION_REGIONS[5])
}

/// Classify a point in arousal-valence space
///
/// # Returns
/// Tuple of (emotion, confidence) where confidence is `1 - distance` to the
/// winning region center, clamped to [0, 1]
pub fn classify(arousal: f32, valence: f32) -> (EmotionType, f32) {
    nearest_region(&EMOTION_REGIONS, arousal, valence)
}

/// Nearest region center in table order; the first of equally near regions
/// wins
fn nearest_region(regions: &[EmotionRegion], arousal: f32, valence: f32) -> (EmotionType, f32) {
    let mut best = EmotionType::Neutral;
    let mut min_distance = f32::INFINITY;

    for region in regions {
        let (center_arousal, center_valence) = region.center();
        let distance =
            ((arousal - center_arousal).powi(2) + (valence - center_valence).powi(2)).sqrt();
        if distance < min_distance {
            min_distance = distance;
            best = region.emotion;
        }
    }

    (best, (1.0 - min_distance).clamp(0.0, 1.0))
}

#[derive(Debug, Clone)]
pub struct EmotionExtractor {
    current_arousal: f32,
    current_valence: f32,
    current_emotion: EmotionType,
    manual_emotion: Option<EmotionType>,
}

impl EmotionExtractor {
    pub fn new() -> Self {
        Self {
            current_arousal: INITIAL_AROUSAL,
            current_valence: INITIAL_VALENCE,
            current_emotion: EmotionType::Neutral,
            manual_emotion: None,
        }
    }

    /// Estimate the emotion of the current frame
    ///
    /// # Arguments
    /// * `volume` - Loudness features (uses `smoothed`)
    /// * `pitch` - Pitch features (uses all three fields)
    /// * `speed` - Activity features (uses `activity_rate`)
    ///
    /// # Returns
    /// The manual emotion's region center with confidence 1.0 while an
    /// override is active; otherwise the nearest region to the smoothed
    /// arousal/valence point
    pub fn extract(
        &mut self,
        volume: &VolumeData,
        pitch: &PitchData,
        speed: &SpeedData,
    ) -> EmotionData {
        if let Some(manual) = self.manual_emotion {
            let (arousal, valence) = region_for(manual).center();
            return EmotionData {
                emotion: manual,
                confidence: 1.0,
                arousal,
                valence,
            };
        }

        let raw_arousal = Self::raw_arousal(volume, pitch, speed);
        let raw_valence = Self::raw_valence(pitch);

        self.current_arousal =
            EMOTION_SMOOTHING * self.current_arousal + (1.0 - EMOTION_SMOOTHING) * raw_arousal;
        self.current_valence =
            EMOTION_SMOOTHING * self.current_valence + (1.0 - EMOTION_SMOOTHING) * raw_valence;

        let (emotion, confidence) = classify(self.current_arousal, self.current_valence);
        self.current_emotion = emotion;

        EmotionData {
            emotion,
            confidence,
            arousal: self.current_arousal.clamp(0.0, 1.0),
            valence: self.current_valence.clamp(-1.0, 1.0),
        }
    }

    fn raw_arousal(volume: &VolumeData, pitch: &PitchData, speed: &SpeedData) -> f32 {
        let pitch_presence = if pitch.confidence > PITCH_CONFIDENCE_GATE {
            0.2
        } else {
            0.0
        };
        (0.5 * volume.smoothed + 0.3 * speed.activity_rate + pitch_presence).clamp(0.0, 1.0)
    }

    fn raw_valence(pitch: &PitchData) -> f32 {
        if pitch.confidence <= PITCH_CONFIDENCE_GATE || pitch.frequency <= 0.0 {
            return 0.0;
        }
        let height =
            ((pitch.frequency - VALENCE_PITCH_CENTER) / VALENCE_PITCH_CENTER).clamp(-1.0, 1.0);
        let movement = (pitch.change_rate / 100.0).clamp(-0.4, 0.4);
        height * 0.6 + movement
    }

    /// Force an emotion until [`clear_manual_emotion`](Self::clear_manual_emotion)
    pub fn set_manual_emotion(&mut self, emotion: EmotionType) {
        self.manual_emotion = Some(emotion);
        self.current_emotion = emotion;
    }

    /// Return to automatic detection
    pub fn clear_manual_emotion(&mut self) {
        self.manual_emotion = None;
    }

    pub fn manual_emotion(&self) -> Option<EmotionType> {
        self.manual_emotion
    }

    /// The most recently set or detected emotion
    ///
    /// After clearing an override this stays on the manual emotion until the
    /// next detected frame.
    pub fn current_emotion(&self) -> EmotionType {
        self.current_emotion
    }

    pub fn arousal(&self) -> f32 {
        self.current_arousal
    }

    pub fn valence(&self) -> f32 {
        self.current_valence
    }

    /// Reset internal state, including any manual override
    pub fn reset(&mut self) {
        self.manual_emotion = None;
        self.current_emotion = EmotionType::Neutral;
        self.current_arousal = INITIAL_AROUSAL;
        self.current_valence = INITIAL_VALENCE;
    }
}

impl Default for EmotionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "emotion_tests.rs"]
mod tests;
