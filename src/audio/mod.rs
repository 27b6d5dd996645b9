// Audio module - capture sources feeding the analysis pipeline
//
// A capture source exposes one borrowed snapshot per frame: the magnitude
// spectrum in dB and the time-domain window. Snapshots are valid for a
// single engine call and never retained.

pub mod analyser;
pub mod wav;

pub use analyser::SpectrumAnalyser;
pub use wav::WavCapture;

/// Sample rate assumed until a real capture connects
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Read-only view of one frame of capture data
#[derive(Debug, Clone, Copy)]
pub struct CaptureFrame<'a> {
    /// Magnitude spectrum in dB, one value per frequency bin
    pub frequency_db: &'a [f32],
    /// Amplitude samples in [-1, 1]
    pub time_domain: &'a [f32],
    pub sample_rate: u32,
}

impl<'a> CaptureFrame<'a> {
    /// True when neither buffer carries data
    pub fn is_empty(&self) -> bool {
        self.frequency_db.is_empty() && self.time_domain.is_empty()
    }
}

/// Anything that can hand the engine a frame of capture data
pub trait CaptureSource {
    fn sample_rate(&self) -> u32;

    /// Borrow the current buffers
    fn snapshot(&self) -> CaptureFrame<'_>;
}
