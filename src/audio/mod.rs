//! Audio playback and spectrum analysis.
//!
//! Plays a decoded track through cpal while an FFT analyser reduces
//! the most recent samples to byte spectra for audio-reactive visuals.

mod analyser;
mod bands;
mod playback;

// Re-export public types
pub use analyser::{blackman_window, SampleRing, SampleTap, SpectrumAnalyser, SpectrumSource};
pub use bands::{reduce_partition, BandLayout, BandReducer, BandScalars};
pub use playback::{AudioPlayer, Track, Voice, WavPlayer};
