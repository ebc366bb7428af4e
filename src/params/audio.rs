//! Spectrum analysis and playback configuration.

use std::path::PathBuf;

use crate::error::{Result, VisualizerError};

/// Spectrum analyser configuration (byte-spectrum semantics of a Web Audio analyser)
#[derive(Debug, Clone)]
pub struct AnalyserConfig {
    /// FFT window size (power of 2, 32..=32768)
    /// Snapshot length is half of this: 1024 → 512 bins
    pub fft_size: usize,

    /// Time constant of the per-bin exponential smoothing (0 = none, 1 = frozen)
    pub smoothing_time_constant: f32,

    /// Magnitude mapped to byte 0 (dBFS)
    pub min_decibels: f32,

    /// Magnitude mapped to byte 255 (dBFS)
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024, // Lower resolution than the usual 2048 to save work per frame
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyserConfig {
    /// Number of frequency bins in a snapshot
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(VisualizerError::InvalidConfig(format!(
                "FFT size must be a power of 2 in 32..=32768, got {}",
                self.fft_size
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing_time_constant) {
            return Err(VisualizerError::InvalidConfig(format!(
                "smoothing time constant must be in [0, 1], got {}",
                self.smoothing_time_constant
            )));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(VisualizerError::InvalidConfig(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            )));
        }
        Ok(())
    }
}

/// Audio track playback configuration
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// WAV file to play
    pub track_path: PathBuf,

    /// Restart from the beginning when the track ends
    pub looping: bool,

    /// Output gain (linear, 1.0 = unchanged)
    pub volume: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            track_path: PathBuf::from("assets/HKW_Moabeat_schreiber.wav"),
            looping: true,
            volume: 1.0,
        }
    }
}
