use super::*;
use crate::mapping::SpacingMode;
use crate::testing::{flat_spectrum, generate_silence, generate_sine_wave};
use std::sync::Arc;

const FRAME_MS: f64 = 16.0;

fn engine() -> WaveformEngine {
    WaveformEngine::new(AppConfig::default()).unwrap()
}

struct Buffers {
    frequency_db: Vec<f32>,
    time_domain: Vec<f32>,
}

impl Buffers {
    fn voiced(frequency: f32, db: f32) -> Self {
        Self {
            frequency_db: flat_spectrum(1024, db),
            time_domain: generate_sine_wave(44100, frequency, 2048, 0.8),
        }
    }

    fn silent() -> Self {
        Self {
            frequency_db: flat_spectrum(1024, -160.0),
            time_domain: generate_silence(2048),
        }
    }

    fn frame(&self) -> CaptureFrame<'_> {
        CaptureFrame {
            frequency_db: &self.frequency_db,
            time_domain: &self.time_domain,
            sample_rate: 44100,
        }
    }
}

fn run_idle(engine: &mut WaveformEngine, frames: usize) -> FrameData {
    let mut last = None;
    for i in 0..frames {
        last = Some(engine.process_frame(None, i as f64 * FRAME_MS, FRAME_MS));
    }
    last.unwrap()
}

fn run_frames(
    engine: &mut WaveformEngine,
    buffers: &Buffers,
    frames: usize,
    start_ms: f64,
) -> FrameData {
    let mut last = None;
    for i in 0..frames {
        let now = start_ms + i as f64 * FRAME_MS;
        last = Some(engine.process_frame(Some(buffers.frame()), now, FRAME_MS));
    }
    last.unwrap()
}

#[test]
fn test_new_engine_state() {
    let engine = engine();
    assert_eq!(engine.current_emotion(), EmotionType::Neutral);
    assert!(!engine.is_connected());
    assert_eq!(engine.sample_rate(), DEFAULT_SAMPLE_RATE);
    assert!(engine.frame_data().is_none());
    assert!(engine.audio_features().is_none());
    assert_eq!(engine.presets().len(), 6);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = AppConfig::default();
    config.audio.min_decibels = -10.0;
    config.audio.max_decibels = -90.0;
    assert_eq!(
        WaveformEngine::new(config).unwrap_err(),
        ConfigError::InvalidDecibelRange {
            min_db: -10.0,
            max_db: -90.0
        }
    );

    let mut config = AppConfig::default();
    config.audio.vad.window_size = 0;
    assert!(WaveformEngine::new(config).is_err());
}

#[test]
fn test_idle_frames_settle_toward_neutral_rest() {
    let mut engine = engine();

    let mut previous = 0.3;
    for i in 0..10 {
        let frame = engine.process_frame(None, i as f64 * FRAME_MS, FRAME_MS);
        assert_eq!(frame.emotion.emotion, EmotionType::Neutral);
        assert!(frame.shape.amplitude < previous);
        assert!(frame.shape.amplitude > 0.2);
        previous = frame.shape.amplitude;
    }

    let frame = engine.frame_data().unwrap();
    assert_eq!(frame.bands, vec![0.0; 24]);
    assert!((frame.phase - 0.16).abs() < 1e-9);

    let frame = run_idle(&mut engine, 500);
    assert!((frame.shape.amplitude - 0.2).abs() < 1e-3);
    assert!(engine.drain_events().is_empty());
}

#[test]
fn test_disconnected_engine_ignores_capture() {
    let mut engine = engine();
    let loud = Buffers::voiced(440.0, -10.0);

    run_frames(&mut engine, &loud, 100, 0.0);

    assert_eq!(engine.current_emotion(), EmotionType::Neutral);
    let features = engine.audio_features().unwrap();
    assert_eq!(features.volume, VolumeData::default());
    assert!(engine.drain_events().is_empty());
}

#[test]
fn test_empty_frame_takes_idle_path() {
    let mut engine = engine();
    engine.connect_capture(44100).unwrap();
    engine.drain_events();

    let empty = CaptureFrame {
        frequency_db: &[],
        time_domain: &[],
        sample_rate: 44100,
    };
    let frame = engine.process_frame(Some(empty), 0.0, FRAME_MS);
    assert_eq!(frame.emotion.emotion, EmotionType::Neutral);
    assert_eq!(frame.bands.len(), 24);
}

#[test]
fn test_loud_bright_voice_becomes_excited() {
    let mut engine = engine();
    engine.connect_capture(44100).unwrap();
    assert_eq!(
        engine.drain_events(),
        vec![EngineEvent::CaptureConnected { sample_rate: 44100 }]
    );

    let loud = Buffers::voiced(440.0, -10.0);
    let frame = run_frames(&mut engine, &loud, 120, 0.0);

    assert_eq!(frame.emotion.emotion, EmotionType::Excited);
    assert_eq!(engine.current_emotion(), EmotionType::Excited);

    let features = engine.audio_features().unwrap();
    assert!(features.volume.smoothed > 0.9);
    assert!((features.pitch.frequency - 440.0).abs() < 10.0);
    assert!(features.speed.is_active);
    assert!(features.bands.iter().all(|&b| b > 0.9));

    let events = engine.drain_events();
    assert!(matches!(
        events.first(),
        Some(EngineEvent::EmotionChange {
            from: EmotionType::Neutral,
            ..
        })
    ));
    assert!(matches!(
        events.last(),
        Some(EngineEvent::EmotionChange {
            to: EmotionType::Excited,
            ..
        })
    ));
    assert!(engine.drain_events().is_empty());
}

#[test]
fn test_detected_emotion_applies_preset() {
    let mut engine = engine();
    engine.connect_capture(44100).unwrap();

    let loud = Buffers::voiced(440.0, -10.0);
    run_frames(&mut engine, &loud, 120, 0.0);
    assert_eq!(engine.current_emotion(), EmotionType::Excited);

    // A long step passes the categorical switch point
    let frame = engine.process_frame(Some(loud.frame()), 2000.0, 500.0);
    assert_eq!(frame.dynamic.wave_pattern, WavePattern::Pulsing);
    assert_eq!(frame.shape.spacing_mode, SpacingMode::Jumping);
    // excited amplitude range is 0.7-1.0
    assert!(frame.shape.amplitude > 0.9);
}

#[test]
fn test_silence_after_speech_drifts_away_from_excited() {
    let mut engine = engine();
    engine.connect_capture(44100).unwrap();

    run_frames(&mut engine, &Buffers::voiced(440.0, -10.0), 120, 0.0);
    assert_eq!(engine.current_emotion(), EmotionType::Excited);

    run_frames(&mut engine, &Buffers::silent(), 300, 2000.0);
    assert_eq!(engine.current_emotion(), EmotionType::Calm);
}

#[test]
fn test_manual_emotion_emits_single_event() {
    let mut engine = engine();

    engine.set_manual_emotion(EmotionType::Sad);
    engine.set_manual_emotion(EmotionType::Sad);
    assert_eq!(engine.current_emotion(), EmotionType::Sad);
    assert_eq!(
        engine.drain_events(),
        vec![EngineEvent::EmotionChange {
            from: EmotionType::Neutral,
            to: EmotionType::Sad,
        }]
    );

    engine.set_manual_emotion(EmotionType::Neutral);
    assert_eq!(engine.drain_events().len(), 1);
}

#[test]
fn test_undrained_events_drop_oldest() {
    let mut engine = engine();
    for i in 0..300 {
        let emotion = if i % 2 == 0 { EmotionType::Sad } else { EmotionType::Happy };
        engine.set_manual_emotion(emotion);
    }

    let events = engine.drain_events();
    assert_eq!(events.len(), MAX_PENDING_EVENTS);
    // The first 44 changes, starting with neutral -> sad, were dropped
    assert_eq!(
        events.first(),
        Some(&EngineEvent::EmotionChange {
            from: EmotionType::Happy,
            to: EmotionType::Sad,
        })
    );
    assert_eq!(
        events.last(),
        Some(&EngineEvent::EmotionChange {
            from: EmotionType::Sad,
            to: EmotionType::Happy,
        })
    );
    assert!(engine.drain_events().is_empty());
}

#[test]
fn test_manual_emotion_overrides_capture() {
    let mut engine = engine();
    engine.connect_capture(44100).unwrap();
    engine.set_manual_emotion(EmotionType::Angry);

    let frame = run_frames(&mut engine, &Buffers::voiced(440.0, -10.0), 60, 0.0);
    assert_eq!(frame.emotion.emotion, EmotionType::Angry);
    assert_eq!(frame.emotion.confidence, 1.0);

    let frame = engine.process_frame(None, 1000.0, 500.0);
    assert_eq!(frame.emotion.emotion, EmotionType::Angry);
    assert_eq!(frame.dynamic.wave_pattern, WavePattern::Shaking);

    engine.clear_manual_emotion();
    run_frames(&mut engine, &Buffers::voiced(440.0, -10.0), 120, 2000.0);
    assert_eq!(engine.current_emotion(), EmotionType::Excited);
}

#[test]
fn test_blended_emotion_picks_dominant_weight() {
    let mut engine = engine();

    engine.set_blended_emotion(&[
        (EmotionType::Happy, 0.2),
        (EmotionType::Sad, 0.7),
        (EmotionType::Calm, 0.1),
    ]);
    assert_eq!(engine.current_emotion(), EmotionType::Sad);

    engine.set_blended_emotion(&[(EmotionType::Happy, 0.5), (EmotionType::Angry, 0.5)]);
    assert_eq!(engine.current_emotion(), EmotionType::Happy);

    engine.set_blended_emotion(&[(EmotionType::Angry, 0.0)]);
    assert_eq!(engine.current_emotion(), EmotionType::Neutral);

    engine.set_blended_emotion(&[]);
    assert_eq!(engine.current_emotion(), EmotionType::Neutral);
}

#[test]
fn test_blended_colors_mix_presets() {
    let engine = engine();
    let mixed = engine.blended_colors(&[(EmotionType::Sad, 1.0), (EmotionType::Calm, 0.0)]);
    let sad = engine.presets().get_emotion(EmotionType::Sad).unwrap();
    assert!((mixed.primary.hue - sad.primary.hue).abs() < 1e-3);
}

#[test]
fn test_connect_and_disconnect_events() {
    let mut engine = engine();

    assert_eq!(
        engine.connect_capture(0).unwrap_err(),
        ConfigError::InvalidSampleRate { sample_rate: 0 }
    );
    assert!(!engine.is_connected());

    engine.connect_capture(48000).unwrap();
    assert!(engine.is_connected());
    assert_eq!(engine.sample_rate(), 48000);

    engine.disconnect_capture();
    engine.disconnect_capture();
    assert!(!engine.is_connected());

    assert_eq!(
        engine.drain_events(),
        vec![
            EngineEvent::CaptureConnected { sample_rate: 48000 },
            EngineEvent::CaptureDisconnected,
        ]
    );
}

#[test]
fn test_registered_pattern_shapes_envelope() {
    let mut engine = engine();
    engine.register_pattern(WavePattern::Breathing, Arc::new(|_phase, _base| 0.125));

    let frame = engine.process_frame(None, 0.0, FRAME_MS);
    assert_eq!(frame.dynamic.wave_pattern, WavePattern::Breathing);
    assert_eq!(frame.envelope, 0.125);
}

#[test]
fn test_envelope_follows_builtin_pattern() {
    let mut engine = engine();
    let frame = engine.process_frame(None, 0.0, 1000.0);
    let expected =
        crate::mapping::builtin_modulation(WavePattern::Breathing, 1.0, frame.shape.amplitude);
    assert!((frame.envelope - expected).abs() < 1e-6);
}

#[test]
fn test_custom_preset_from_config() {
    let mut config = AppConfig::default();
    let mut calm_neutral = crate::mapping::BUILT_IN_PRESETS[&EmotionType::Neutral];
    calm_neutral.wave_pattern = WavePattern::Steady;
    calm_neutral.amplitude_range = crate::mapping::ValueRange::new(0.5, 0.6);
    config
        .custom_presets
        .insert("neutral".to_string(), calm_neutral);

    let mut engine = WaveformEngine::new(config).unwrap();
    let frame = engine.process_frame(None, 0.0, 1000.0);
    assert_eq!(frame.dynamic.wave_pattern, WavePattern::Steady);
    assert!((frame.shape.amplitude - 0.5).abs() < 0.01);
    assert_eq!(frame.envelope, frame.shape.amplitude);
}

#[test]
fn test_register_preset_is_per_engine() {
    let mut custom = engine();
    let mut preset = crate::mapping::BUILT_IN_PRESETS[&EmotionType::Happy];
    preset.glow_intensity = 0.1;
    custom.register_preset("sparkle", preset);

    assert_eq!(custom.presets().len(), 7);
    assert_eq!(custom.presets().get("sparkle"), Some(&preset));
    assert_eq!(engine().presets().len(), 6);
}

#[test]
fn test_reset_restores_initial_state() {
    let mut engine = engine();
    engine.connect_capture(44100).unwrap();
    engine.set_manual_emotion(EmotionType::Angry);
    run_frames(&mut engine, &Buffers::voiced(440.0, -10.0), 10, 0.0);

    engine.reset();
    assert_eq!(engine.current_emotion(), EmotionType::Neutral);
    assert!(engine.frame_data().is_none());
    assert!(engine.is_connected());

    let frame = engine.process_frame(None, 0.0, FRAME_MS);
    assert!((frame.phase - 0.016).abs() < 1e-9);
    assert!(frame.shape.amplitude < 0.3);
}

#[test]
fn test_lerp_speed_changes_convergence() {
    let mut slow = engine();
    let mut fast = engine();
    slow.set_lerp_speed(0.5);
    fast.set_lerp_speed(20.0);

    let slow_frame = run_idle(&mut slow, 10);
    let fast_frame = run_idle(&mut fast, 10);
    assert!(fast_frame.shape.amplitude < slow_frame.shape.amplitude);
}

#[test]
fn test_negative_dt_does_not_rewind_phase() {
    let mut engine = engine();
    engine.process_frame(None, 0.0, 100.0);
    let frame = engine.process_frame(None, 50.0, -100.0);
    assert!((frame.phase - 0.1).abs() < 1e-9);
}

#[test]
fn test_events_serialize_with_kind_tag() {
    let json = serde_json::to_value(EngineEvent::EmotionChange {
        from: EmotionType::Neutral,
        to: EmotionType::Happy,
    })
    .unwrap();
    assert_eq!(json["kind"], "emotion_change");
    assert_eq!(json["from"], "neutral");
    assert_eq!(json["to"], "happy");

    let json = serde_json::to_value(EngineEvent::CaptureDisconnected).unwrap();
    assert_eq!(json["kind"], "capture_disconnected");
}
