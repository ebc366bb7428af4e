//! Error taxonomy for the visualizer.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop the visualizer from starting or stepping a frame.
#[derive(Debug, Error)]
pub enum VisualizerError {
    /// Audio asset missing or not decodable
    #[error("failed to load audio from {path}: {reason}")]
    AudioLoad { path: PathBuf, reason: String },

    /// No usable output device, or the stream could not be built/started
    #[error("audio device error: {0}")]
    AudioDevice(String),

    /// A configuration struct failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A derived render parameter was NaN or infinite
    #[error("non-finite value for {field}: {value}")]
    NonFinite { field: &'static str, value: f32 },

    /// GPU adapter/device/surface failure
    #[error("render error: {0}")]
    Render(String),

    /// A frame was stepped before the driver was started
    #[error("frame driver stepped before start")]
    NotStarted,
}

pub type Result<T> = std::result::Result<T, VisualizerError>;

/// Reject NaN and infinities with the name of the offending field.
pub fn ensure_finite(field: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(VisualizerError::NonFinite { field, value })
    }
}
