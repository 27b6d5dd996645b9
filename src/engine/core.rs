//! WaveformEngine: the per-frame feature-to-visual pipeline.
//!
//! One engine owns every extractor, channel and the interpolator. Each call
//! to [`WaveformEngine::process_frame`] runs the pipeline once:
//! capture -> {volume, pitch, speed, bands} -> emotion -> {color, shape,
//! dynamic} -> interpolator -> [`FrameData`].
//!
//! Without a connected capture (or with an empty frame) the extractors are
//! skipped and the idle feature set is used instead, so visuals ease toward
//! the current emotion's resting state.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::analysis::{
    AudioFeatures, EmotionData, EmotionExtractor, EmotionType, MultibandProcessor, PitchData,
    PitchExtractor, SpeedData, SpeedExtractor, VolumeData, VolumeExtractor,
};
use crate::audio::{CaptureFrame, DEFAULT_SAMPLE_RATE};
use crate::config::AppConfig;
use crate::error::{log_config_error, ConfigError};
use crate::mapping::{
    ColorChannel, ColorParams, DynamicChannel, DynamicParams, EmotionColorPreset,
    PatternModulator, PresetRegistry, ShapeChannel, ShapeParams, UnifiedInterpolator,
    WavePattern,
};

#[cfg(test)]
mod tests;

/// Phase units advanced per millisecond of frame time
const PHASE_PER_MS: f64 = 0.001;

/// Undrained events kept before the oldest are dropped
pub const MAX_PENDING_EVENTS: usize = 256;

/// Immutable snapshot handed to renderers once per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameData {
    pub timestamp_ms: f64,
    pub emotion: EmotionData,
    pub color: ColorParams,
    pub shape: ShapeParams,
    pub dynamic: DynamicParams,
    /// Smoothed band energies (0.0-1.0)
    pub bands: Vec<f32>,
    /// Animation phase accumulator
    pub phase: f64,
    /// Shape amplitude after the wave pattern's modulation at `phase`
    pub envelope: f32,
}

/// Events recorded by the engine, drained by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineEvent {
    EmotionChange { from: EmotionType, to: EmotionType },
    CaptureConnected { sample_rate: u32 },
    CaptureDisconnected,
}

/// WaveformEngine owns the whole analysis and mapping pipeline.
#[derive(Debug)]
pub struct WaveformEngine {
    config: AppConfig,
    volume: VolumeExtractor,
    pitch: PitchExtractor,
    speed: SpeedExtractor,
    emotion: EmotionExtractor,
    multiband: MultibandProcessor,
    color: ColorChannel,
    shape: ShapeChannel,
    dynamic: DynamicChannel,
    interpolator: UnifiedInterpolator,
    connected: bool,
    phase: f64,
    events: VecDeque<EngineEvent>,
    last_frame: Option<FrameData>,
    last_features: Option<AudioFeatures>,
}

impl WaveformEngine {
    /// Build an engine from a configuration.
    ///
    /// The configuration is validated first; custom presets are registered on
    /// top of the built-ins and the initial emotion's preset is applied.
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        if let Err(err) = config.validate() {
            log_config_error(&err, "WaveformEngine");
            return Err(err);
        }

        let audio = &config.audio;
        let volume = VolumeExtractor::new(
            audio.smoothing_time_constant,
            audio.min_decibels,
            audio.max_decibels,
        )?;
        let pitch = PitchExtractor::new(DEFAULT_SAMPLE_RATE, &audio.pitch)?;
        let speed = SpeedExtractor::new(&audio.vad, audio.min_decibels, audio.max_decibels)?;
        let multiband = MultibandProcessor::new(
            audio.band_count,
            audio.min_decibels,
            audio.max_decibels,
            audio.band_smoothing,
        )?;

        let mut registry = PresetRegistry::new();
        for (name, preset) in &config.custom_presets {
            registry.register(name.clone(), *preset);
        }

        let mapping = &config.mapping;
        let color = ColorChannel::new(registry);
        let shape = ShapeChannel::new(
            mapping.amplitude_range,
            mapping.spacing_range,
            audio.band_count,
        );
        let dynamic = DynamicChannel::new(mapping.speed_range, mapping.transition_range);
        let interpolator = UnifiedInterpolator::new(config.animation.lerp_speed);

        let mut engine = Self {
            volume,
            pitch,
            speed,
            emotion: EmotionExtractor::new(),
            multiband,
            color,
            shape,
            dynamic,
            interpolator,
            connected: false,
            phase: 0.0,
            events: VecDeque::with_capacity(MAX_PENDING_EVENTS),
            last_frame: None,
            last_features: None,
            config,
        };
        engine.apply_emotion_preset(engine.config.initial_emotion);

        tracing::debug!(
            bands = engine.config.audio.band_count,
            algorithm = ?engine.config.audio.pitch.algorithm,
            initial_emotion = %engine.config.initial_emotion,
            "waveform engine created"
        );
        Ok(engine)
    }

    /// Run the pipeline for one frame.
    ///
    /// # Arguments
    /// * `frame` - Capture snapshot for this frame, if any
    /// * `timestamp_ms` - Frame timestamp in milliseconds
    /// * `dt_ms` - Time since the previous frame in milliseconds
    ///
    /// # Returns
    /// The interpolated frame; also kept as [`frame_data`](Self::frame_data)
    pub fn process_frame(
        &mut self,
        frame: Option<CaptureFrame<'_>>,
        timestamp_ms: f64,
        dt_ms: f64,
    ) -> FrameData {
        let dt_ms = dt_ms.max(0.0);
        self.phase += dt_ms * PHASE_PER_MS;

        let features = match frame {
            Some(frame) if self.connected && !frame.is_empty() => {
                self.extract_features(&frame, timestamp_ms)
            }
            _ => self.idle_features(timestamp_ms),
        };

        let target_color = self.color.map(&features.emotion);
        let target_shape = self.shape.map(&features.volume, &features.pitch);
        let target_dynamic = self.dynamic.map(&features.speed, &features.volume);
        let visuals = self.interpolator.interpolate(
            &target_color,
            &target_shape,
            &target_dynamic,
            dt_ms as f32,
        );

        let envelope = self.dynamic.modulate(
            visuals.dynamic.wave_pattern,
            self.phase as f32,
            visuals.shape.amplitude,
        );

        let frame_data = FrameData {
            timestamp_ms,
            emotion: features.emotion,
            color: visuals.color,
            shape: visuals.shape,
            dynamic: visuals.dynamic,
            bands: features.bands.clone(),
            phase: self.phase,
            envelope,
        };

        tracing::trace!(
            emotion = %frame_data.emotion.emotion,
            amplitude = frame_data.shape.amplitude,
            phase = frame_data.phase,
            "frame processed"
        );

        self.last_features = Some(features);
        self.last_frame = Some(frame_data.clone());
        frame_data
    }

    fn extract_features(&mut self, frame: &CaptureFrame<'_>, timestamp_ms: f64) -> AudioFeatures {
        let previous = self.emotion.current_emotion();

        let volume = self.volume.extract(frame.frequency_db);
        let pitch = self.pitch.extract(frame.time_domain, timestamp_ms);
        let speed = self.speed.extract(frame.frequency_db, timestamp_ms);
        let emotion = self.emotion.extract(&volume, &pitch, &speed);
        let bands = self.multiband.process(frame.frequency_db);

        if emotion.emotion != previous {
            self.on_emotion_change(previous, emotion.emotion);
        }

        AudioFeatures {
            volume,
            pitch,
            speed,
            emotion,
            bands,
            timestamp_ms,
        }
    }

    fn idle_features(&self, timestamp_ms: f64) -> AudioFeatures {
        AudioFeatures {
            volume: VolumeData::default(),
            pitch: PitchData::default(),
            speed: SpeedData::default(),
            emotion: EmotionData {
                emotion: self.emotion.current_emotion(),
                ..EmotionData::default()
            },
            bands: vec![0.0; self.multiband.band_count()],
            timestamp_ms,
        }
    }

    fn on_emotion_change(&mut self, from: EmotionType, to: EmotionType) {
        tracing::debug!(%from, %to, "emotion changed");
        self.apply_emotion_preset(to);
        self.push_event(EngineEvent::EmotionChange { from, to });
    }

    fn push_event(&mut self, event: EngineEvent) {
        if self.events.len() == MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    fn apply_emotion_preset(&mut self, emotion: EmotionType) {
        if let Some(preset) = self.color.preset(emotion).copied() {
            self.shape.apply_emotion_preset(&preset);
            self.dynamic.apply_emotion_preset(&preset);
            tracing::debug!(%emotion, pattern = ?preset.wave_pattern, "emotion preset applied");
        }
    }

    // ==================== Capture ====================

    /// Mark a capture as connected and rebuild the pitch extractor for its
    /// sample rate.
    pub fn connect_capture(&mut self, sample_rate: u32) -> Result<(), ConfigError> {
        self.pitch = PitchExtractor::new(sample_rate, &self.config.audio.pitch).map_err(|err| {
            log_config_error(&err, "WaveformEngine::connect_capture");
            err
        })?;
        self.connected = true;
        self.push_event(EngineEvent::CaptureConnected { sample_rate });
        tracing::debug!(sample_rate, "capture connected");
        Ok(())
    }

    /// Return to the idle path. Extractor state is kept.
    pub fn disconnect_capture(&mut self) {
        if self.connected {
            self.connected = false;
            self.push_event(EngineEvent::CaptureDisconnected);
            tracing::debug!("capture disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Sample rate the pitch extractor is currently tuned to
    pub fn sample_rate(&self) -> u32 {
        self.pitch.sample_rate()
    }

    // ==================== Emotion ====================

    pub fn current_emotion(&self) -> EmotionType {
        self.emotion.current_emotion()
    }

    /// Override detection with a fixed emotion and apply its preset.
    pub fn set_manual_emotion(&mut self, emotion: EmotionType) {
        let previous = self.emotion.current_emotion();
        self.emotion.set_manual_emotion(emotion);
        self.apply_emotion_preset(emotion);
        if previous != emotion {
            tracing::debug!(from = %previous, to = %emotion, "manual emotion set");
            self.push_event(EngineEvent::EmotionChange {
                from: previous,
                to: emotion,
            });
        }
    }

    /// Override with the most heavily weighted emotion.
    ///
    /// Only a strictly greater positive weight replaces the running choice,
    /// so ties keep the earlier entry and all-zero input selects neutral.
    pub fn set_blended_emotion(&mut self, weights: &[(EmotionType, f32)]) {
        let mut dominant = EmotionType::Neutral;
        let mut max_weight = 0.0f32;
        for &(emotion, weight) in weights {
            if weight > max_weight {
                max_weight = weight;
                dominant = emotion;
            }
        }
        self.set_manual_emotion(dominant);
    }

    /// Resume automatic detection.
    pub fn clear_manual_emotion(&mut self) {
        self.emotion.clear_manual_emotion();
    }

    /// Palette that blends several emotions, for hosts that render mixes.
    pub fn blended_colors(&self, weights: &[(EmotionType, f32)]) -> ColorParams {
        self.color.map_blended(weights)
    }

    // ==================== Presets & patterns ====================

    pub fn register_preset(&mut self, name: impl Into<String>, preset: EmotionColorPreset) {
        self.color.register_preset(name, preset);
    }

    pub fn presets(&self) -> &PresetRegistry {
        self.color.presets()
    }

    pub fn register_pattern(&mut self, pattern: WavePattern, modulator: PatternModulator) {
        self.dynamic.register_pattern(pattern, modulator);
    }

    // ==================== Output ====================

    /// Take every event recorded since the last drain, oldest first.
    ///
    /// At most [`MAX_PENDING_EVENTS`] are held; when a host stops draining,
    /// the oldest events are dropped to make room.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    pub fn frame_data(&self) -> Option<&FrameData> {
        self.last_frame.as_ref()
    }

    pub fn audio_features(&self) -> Option<&AudioFeatures> {
        self.last_features.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn set_lerp_speed(&mut self, speed: f32) {
        self.interpolator.set_lerp_speed(speed);
    }

    /// Clear all smoothing state and the phase accumulator.
    ///
    /// Registered presets and patterns, connection state and pending events
    /// are kept.
    pub fn reset(&mut self) {
        self.volume.reset();
        self.pitch.reset();
        self.speed.reset();
        self.emotion.reset();
        self.multiband.reset();
        self.interpolator = UnifiedInterpolator::new(self.interpolator.lerp_speed());
        self.phase = 0.0;
        self.last_frame = None;
        self.last_features = None;
        self.apply_emotion_preset(self.config.initial_emotion);
    }
}
