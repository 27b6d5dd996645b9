// WavCapture - recorded PCM source backed by a WAV file
//
// Integer samples are scaled by 2^(bits-1) into [-1, 1]; 32-bit float
// samples are taken as is. Multi-channel audio is mixed down to mono by
// averaging each frame.

use hound::{SampleFormat, WavReader};
use std::io::Read;
use std::path::Path;

use crate::error::{log_capture_error, CaptureError};

#[derive(Debug, Clone)]
pub struct WavCapture {
    samples: Vec<f32>,
    sample_rate: u32,
    position: usize,
}

impl WavCapture {
    /// Open and fully decode a WAV file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CaptureError> {
        let capture = WavReader::open(path.as_ref())
            .map_err(CaptureError::from)
            .and_then(Self::from_wav_reader)
            .map_err(|err| {
                log_capture_error(&err, "WavCapture::open");
                err
            })?;
        log::info!(
            "[Capture] Loaded {:?}: {} samples at {} Hz",
            path.as_ref(),
            capture.samples.len(),
            capture.sample_rate
        );
        Ok(capture)
    }

    /// Decode WAV data from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CaptureError> {
        Self::from_wav_reader(WavReader::new(reader)?)
    }

    fn from_wav_reader<R: Read>(reader: WavReader<R>) -> Result<Self, CaptureError> {
        let spec = reader.spec();
        let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, 32) => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
            (SampleFormat::Int, bits @ 1..=32) => {
                let scale = (1u64 << (bits - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|sample| sample.map(|s| s as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
            (SampleFormat::Float, bits) => {
                return Err(CaptureError::UnsupportedFormat {
                    bits,
                    format: "float",
                })
            }
            (SampleFormat::Int, bits) => {
                return Err(CaptureError::UnsupportedFormat { bits, format: "int" })
            }
        };

        let channels = spec.channels.max(1) as usize;
        let samples: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        if samples.is_empty() {
            return Err(CaptureError::EmptyStream);
        }

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
            position: 0,
        })
    }

    /// Next block of at most `len` mono samples, `None` once exhausted
    pub fn next_chunk(&mut self, len: usize) -> Option<&[f32]> {
        if self.position >= self.samples.len() || len == 0 {
            return None;
        }
        let start = self.position;
        let end = (start + len).min(self.samples.len());
        self.position = end;
        Some(&self.samples[start..end])
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Mono samples in [-1, 1]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn duration_ms(&self) -> f64 {
        self.samples.len() as f64 * 1000.0 / self.sample_rate as f64
    }

    /// Rewind to the first sample
    pub fn rewind(&mut self) {
        self.position = 0;
    }
}
