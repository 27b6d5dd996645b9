// Capture source error types

use crate::error::ErrorCode;
use log::error;
use thiserror::Error;

/// Log a capture error with structured context
pub fn log_capture_error(err: &CaptureError, context: &str) {
    error!(
        "Capture error in {}: code={}, component=CaptureSource, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while opening or decoding a recorded capture
///
/// Live capture devices are external collaborators; these errors only cover
/// the file-backed source used by the CLI and tests.
///
/// Error code range: 4001-4003
#[derive(Debug, Error)]
pub enum CaptureError {
    /// WAV file could not be opened or decoded
    #[error("failed to read WAV data: {0}")]
    Wav(#[from] hound::Error),

    /// Sample format the reader does not handle
    #[error("unsupported sample format: {bits} bit {format}")]
    UnsupportedFormat { bits: u16, format: &'static str },

    /// File contained no samples
    #[error("capture stream is empty")]
    EmptyStream,
}

impl ErrorCode for CaptureError {
    fn code(&self) -> i32 {
        match self {
            CaptureError::Wav(_) => 4001,
            CaptureError::UnsupportedFormat { .. } => 4002,
            CaptureError::EmptyStream => 4003,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_error_codes() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.wav");
        assert_eq!(CaptureError::Wav(hound::Error::IoError(io_err)).code(), 4001);
        assert_eq!(
            CaptureError::UnsupportedFormat {
                bits: 8,
                format: "float"
            }
            .code(),
            4002
        );
        assert_eq!(CaptureError::EmptyStream.code(), 4003);
    }

    #[test]
    fn test_hound_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.wav");
        let err: CaptureError = hound::Error::IoError(io_err).into();
        assert!(err.message().contains("missing.wav"));
    }
}
