//! Engine module housing the waveform pipeline.
//!
//! `core` wires the extractors, mapping channels and interpolator together
//! behind [`WaveformEngine`] and defines the per-frame output it produces.

pub mod core;

pub use core::{EngineEvent, FrameData, WaveformEngine, MAX_PENDING_EVENTS};
