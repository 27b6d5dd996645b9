// Error types for the emotive waveform core
//
// Per-frame extraction never fails: degenerate inputs fall back to zero or
// neutral results. Errors surface only for configuration misuse (at
// construction or in setters) and for capture sources that read from disk.

mod capture;
mod config;

pub use capture::{log_capture_error, CaptureError};
pub use config::{log_config_error, ConfigError};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, so callers can branch on a stable numeric code
/// instead of matching on message text.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
