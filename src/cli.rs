//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::driver::VisualizerConfig;
use crate::params::{AnalyserConfig, BandNormalization, PlaybackConfig, RenderConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "tunnelviz")]
#[command(about = "Audio-reactive tunnel flight with a pulsing torus knot", long_about = None)]
pub struct Args {
    /// WAV file to play and analyse
    #[arg(value_name = "AUDIO", default_value = "assets/HKW_Moabeat_schreiber.wav")]
    pub audio: PathBuf,

    /// Play the track once instead of looping
    #[arg(long)]
    pub no_loop: bool,

    /// Analyser FFT window (power of two, 32..=32768)
    #[arg(long, value_name = "SAMPLES", default_value_t = 1024)]
    pub fft_size: usize,

    /// Path progress per frame
    #[arg(long, value_name = "FRACTION", default_value_t = 0.0001)]
    pub step: f64,

    /// Camera roll per unit of accumulated progress (radians)
    #[arg(long, value_name = "RADIANS", default_value_t = 20.0)]
    pub roll: f64,

    #[arg(long, value_name = "PIXELS", default_value_t = 1280)]
    pub width: u32,

    #[arg(long, value_name = "PIXELS", default_value_t = 720)]
    pub height: u32,

    /// Divide band means by partition length once instead of twice
    #[arg(long)]
    pub single_norm: bool,

    /// Output volume (0.0..=1.0); analysis is unaffected
    #[arg(long, value_name = "GAIN", default_value_t = 1.0)]
    pub volume: f32,
}

impl Args {
    pub fn analyser_config(&self) -> AnalyserConfig {
        AnalyserConfig {
            fft_size: self.fft_size,
            ..AnalyserConfig::default()
        }
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            track_path: self.audio.clone(),
            looping: !self.no_loop,
            volume: self.volume.clamp(0.0, 1.0),
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width,
            window_height: self.height,
            ..RenderConfig::default()
        }
    }

    /// Session configuration with path and band overrides applied
    pub fn visualizer_config(&self) -> VisualizerConfig {
        let mut config = VisualizerConfig::default();
        config.path.step_per_frame = self.step;
        config.path.roll_per_progress = self.roll;
        if self.single_norm {
            config.bands.normalization = BandNormalization::Mean;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_config_defaults() {
        let args = Args::parse_from(["tunnelviz"]);
        assert_eq!(args.analyser_config().fft_size, AnalyserConfig::default().fft_size);
        assert!(args.playback_config().looping);

        let config = args.visualizer_config();
        assert_eq!(config.path.step_per_frame, 0.0001);
        assert_eq!(config.path.roll_per_progress, 20.0);
        assert_eq!(config.bands.normalization, BandNormalization::MeanPerLength);
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "tunnelviz",
            "song.wav",
            "--no-loop",
            "--fft-size",
            "2048",
            "--step",
            "0.001",
            "--single-norm",
            "--volume",
            "3.0",
            "--width",
            "640",
        ]);
        assert_eq!(args.playback_config().track_path, PathBuf::from("song.wav"));
        assert!(!args.playback_config().looping);
        assert_eq!(args.playback_config().volume, 1.0);
        assert_eq!(args.analyser_config().bin_count(), 1024);
        assert_eq!(args.render_config().window_width, 640);

        let config = args.visualizer_config();
        assert_eq!(config.path.step_per_frame, 0.001);
        assert_eq!(config.bands.normalization, BandNormalization::Mean);
    }
}
