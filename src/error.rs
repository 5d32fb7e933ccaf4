//! Error types for Subtone
//!
//! All fallible operations return [`Result`], never panic across the
//! block-processing boundary.

use thiserror::Error;

/// Result type alias using SubtoneError
pub type Result<T> = std::result::Result<T, SubtoneError>;

/// All possible errors in Subtone
#[derive(Error, Debug)]
pub enum SubtoneError {
    // Audio I/O errors
    #[error("Failed to read audio file: {path}")]
    AudioReadError {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("Failed to write audio file: {path}")]
    AudioWriteError {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("Unsupported audio format: {details}")]
    UnsupportedFormat { details: String },

    // Buffer/geometry errors
    #[error("Audio buffer is empty")]
    EmptyBuffer,

    #[error("Channel count not supported: {channels} (expected 1 or 2)")]
    ChannelMismatch { channels: u16 },

    #[error("Stereo block length mismatch: left {left} frames, right {right} frames")]
    BlockLengthMismatch { left: usize, right: usize },

    // Parameter errors
    #[error("Invalid parameter index: {index} (valid range: 0..{count})")]
    InvalidParameter { index: usize, count: usize },

    // Preset errors
    #[error("Preset file error: {details}")]
    PresetError { details: String },

    // Generic I/O
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl SubtoneError {
    /// Returns a suggested recovery action for this error
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::AudioReadError { .. } => "Check that the file exists and is a valid WAV file",
            Self::AudioWriteError { .. } => "Check that the output path is writable",
            Self::UnsupportedFormat { .. } => "Convert to WAV format (16/24/32-bit, mono or stereo)",
            Self::EmptyBuffer => "Load audio before processing",
            Self::ChannelMismatch { .. } => "Downmix the file to mono or stereo first",
            Self::BlockLengthMismatch { .. } => "Deliver equal-length left and right blocks",
            Self::InvalidParameter { .. } => "Use a parameter index below ParamId::COUNT",
            Self::PresetError { .. } => "Check the preset file is valid JSON with 0..1 values",
            _ => "Check the error details and try again",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_display() {
        let err = SubtoneError::InvalidParameter { index: 9, count: 6 };
        assert_eq!(
            err.to_string(),
            "Invalid parameter index: 9 (valid range: 0..6)"
        );
    }

    #[test]
    fn test_recovery_hints_nonempty() {
        let err = SubtoneError::EmptyBuffer;
        assert!(!err.recovery_hint().is_empty());
    }
}
