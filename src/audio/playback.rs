//! Audio track decoding and looping playback.
//!
//! The track is decoded once with hound, then streamed to the default output
//! device through cpal. Every played frame is also mixed to mono across the
//! track's channels and pushed into the analyser's [`SampleTap`].

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::analyser::{SampleRing, SampleTap};
use crate::error::{Result, VisualizerError};
use crate::params::PlaybackConfig;

/// Playback lifecycle seen by the frame driver
pub trait AudioPlayer {
    /// Decode the track; returns its duration
    fn load(&mut self) -> Result<Duration>;

    /// Start playback; loads first if needed
    fn play(&mut self) -> Result<()>;
}

/// Decoded PCM track
#[derive(Debug, Clone)]
pub struct Track {
    /// Interleaved samples in -1..=1
    samples: Arc<Vec<f32>>,
    channels: u16,
    sample_rate: u32,
}

impl Track {
    /// Decode a WAV file from disk
    pub fn open(path: &Path) -> Result<Self> {
        let reader = hound::WavReader::open(path).map_err(|e| VisualizerError::AudioLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_reader(reader).map_err(|reason| VisualizerError::AudioLoad {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Decode any WAV stream (integer or float samples)
    pub fn from_reader<R: Read>(reader: hound::WavReader<R>) -> std::result::Result<Self, String> {
        let spec = reader.spec();
        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(format!("unsupported WAV spec: {:?}", spec));
        }

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| e.to_string())?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1u64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| e.to_string())?
            }
        };

        if samples.is_empty() {
            return Err("WAV file contains no samples".to_string());
        }

        Ok(Self {
            samples: Arc::new(samples),
            channels: spec.channels,
            sample_rate: spec.sample_rate,
        })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }

    fn sample(&self, frame: usize, channel: usize) -> f32 {
        let ch = channel % self.channels as usize;
        self.samples[frame * self.channels as usize + ch]
    }
}

/// Read head over a track, resampling to the device rate by linear interpolation
#[derive(Debug, Clone)]
pub struct Voice {
    track: Track,
    position: f64,
    step: f64,
    looping: bool,
    volume: f32,
}

impl Voice {
    pub fn new(track: Track, output_rate: u32, looping: bool, volume: f32) -> Self {
        let step = track.sample_rate as f64 / output_rate.max(1) as f64;
        Self {
            track,
            position: 0.0,
            step,
            looping,
            volume,
        }
    }

    /// Whether a non-looping voice has run past the end
    pub fn finished(&self) -> bool {
        !self.looping && self.position >= self.track.frame_count() as f64
    }

    /// Track channel `channel` at `index`, blended toward `next` by `frac`
    fn interpolate(&self, index: usize, next: Option<usize>, frac: f32, channel: usize) -> f32 {
        let a = self.track.sample(index, channel);
        let b = next.map_or(a, |n| self.track.sample(n, channel));
        a + (b - a) * frac
    }

    /// Fill interleaved `out` and feed the mono mix of all track channels to `ring`.
    /// A single output channel gets that mix; wider outputs wrap over the track channels.
    pub fn render(&mut self, out: &mut [f32], out_channels: usize, ring: &mut SampleRing) {
        let frames = self.track.frame_count();
        let track_channels = self.track.channels as usize;
        let out_channels = out_channels.max(1);

        for frame in out.chunks_mut(out_channels) {
            if self.finished() {
                frame.fill(0.0);
                ring.push(0.0);
                continue;
            }

            let index = self.position.floor() as usize;
            let frac = (self.position - index as f64) as f32;
            let next = if index + 1 < frames {
                Some(index + 1)
            } else if self.looping {
                Some(0)
            } else {
                None
            };

            let mono = (0..track_channels)
                .map(|channel| self.interpolate(index, next, frac, channel))
                .sum::<f32>()
                / track_channels as f32;
            ring.push(mono);

            if out_channels == 1 {
                frame[0] = mono * self.volume;
            } else {
                for (channel, slot) in frame.iter_mut().enumerate() {
                    *slot = self.interpolate(index, next, frac, channel) * self.volume;
                }
            }

            self.position += self.step;
            if self.looping && self.position >= frames as f64 {
                // One step can span several laps of a very short track
                self.position %= frames as f64;
            }
        }
    }
}

/// WAV player on the default cpal output device
pub struct WavPlayer {
    config: PlaybackConfig,
    tap: SampleTap,
    track: Option<Track>,

    /// Audio output stream (kept alive)
    stream: Option<cpal::Stream>,
}

impl WavPlayer {
    pub fn new(config: PlaybackConfig, tap: SampleTap) -> Self {
        Self {
            config,
            tap,
            track: None,
            stream: None,
        }
    }
}

impl AudioPlayer for WavPlayer {
    fn load(&mut self) -> Result<Duration> {
        let track = Track::open(&self.config.track_path)?;
        let duration = track.duration();
        log::info!(
            "Audio file {} loaded: {:.1}s, {} ch @ {}Hz",
            self.config.track_path.display(),
            duration.as_secs_f32(),
            track.channels(),
            track.sample_rate()
        );
        self.track = Some(track);
        Ok(duration)
    }

    fn play(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }
        let track = match &self.track {
            Some(track) => track.clone(),
            None => {
                self.load()?;
                self.track
                    .clone()
                    .ok_or_else(|| VisualizerError::AudioDevice("track not loaded".to_string()))?
            }
        };

        // Setup audio output device
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| VisualizerError::AudioDevice("no audio output device found".into()))?;

        let supported = device
            .default_output_config()
            .map_err(|e| VisualizerError::AudioDevice(format!("failed to get config: {}", e)))?;

        log::info!(
            "Audio: {} @ {}Hz, {} ch",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            supported.sample_rate().0,
            supported.channels()
        );

        let stream_config: cpal::StreamConfig = supported.into();
        let out_channels = stream_config.channels as usize;
        let mut voice = Voice::new(
            track,
            stream_config.sample_rate.0,
            self.config.looping,
            self.config.volume,
        );
        let tap = self.tap.clone();

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut ring = tap.lock();
                    voice.render(data, out_channels, &mut ring);
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| VisualizerError::AudioDevice(format!("failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| VisualizerError::AudioDevice(format!("failed to start stream: {}", e)))?;

        self.stream = Some(stream);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn wav_bytes(spec: hound::WavSpec, samples: &[i16]) -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        bytes
    }

    fn mono_spec(sample_rate: u32) -> hound::WavSpec {
        hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    fn track_of(samples: &[i16], sample_rate: u32) -> Track {
        track_with_spec(mono_spec(sample_rate), samples)
    }

    fn track_with_spec(spec: hound::WavSpec, samples: &[i16]) -> Track {
        let bytes = wav_bytes(spec, samples);
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        Track::from_reader(reader).unwrap()
    }

    #[test]
    fn test_decode_int_wav() {
        let track = track_of(&[0, 16384, -32768, 32767], 8000);
        assert_eq!(track.channels(), 1);
        assert_eq!(track.frame_count(), 4);
        assert!((track.sample(1, 0) - 0.5).abs() < 1e-6);
        assert!((track.sample(2, 0) + 1.0).abs() < 1e-6);
        assert!((track.duration().as_secs_f64() - 0.0005).abs() < 1e-9);
    }

    #[test]
    fn test_empty_wav_rejected() {
        let bytes = wav_bytes(mono_spec(8000), &[]);
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert!(Track::from_reader(reader).is_err());
    }

    #[test]
    fn test_missing_file_is_audio_load_error() {
        let err = Track::open(Path::new("does/not/exist.wav")).unwrap_err();
        assert!(matches!(err, VisualizerError::AudioLoad { .. }));
    }

    #[test]
    fn test_voice_loops_and_duplicates_mono() {
        let track = track_of(&[16384, -16384], 100);
        let mut voice = Voice::new(track, 100, true, 1.0);
        let tap = SampleTap::new(8);
        let mut out = [0.0f32; 8]; // 4 stereo frames

        voice.render(&mut out, 2, &mut tap.lock());

        assert_eq!(out, [0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, -0.5]);
        assert!(!voice.finished());
    }

    #[test]
    fn test_voice_stops_without_loop() {
        let track = track_of(&[16384, 16384], 100);
        let mut voice = Voice::new(track, 100, false, 0.5);
        let tap = SampleTap::new(4);
        let mut out = [1.0f32; 4];

        voice.render(&mut out, 1, &mut tap.lock());

        assert_eq!(out, [0.25, 0.25, 0.0, 0.0]);
        assert!(voice.finished());
    }

    #[test]
    fn test_voice_feeds_tap() {
        let track = track_of(&[16384, -16384], 100);
        let mut voice = Voice::new(track, 100, true, 0.0);
        let tap = SampleTap::new(2);
        let mut out = [0.0f32; 4];

        voice.render(&mut out, 2, &mut tap.lock());

        // Volume applies to the output only
        assert!(out.iter().all(|&s| s == 0.0));
        let mut ordered = [0.0; 2];
        tap.lock().copy_ordered(&mut ordered);
        assert_eq!(ordered, [0.5, -0.5]);
    }

    #[test]
    fn test_voice_resamples() {
        // Track at half the output rate: every other output frame is interpolated
        let track = track_of(&[0, 16384], 50);
        let mut voice = Voice::new(track, 100, false, 1.0);
        let tap = SampleTap::new(4);
        let mut out = [0.0f32; 3];

        voice.render(&mut out, 1, &mut tap.lock());

        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.25).abs() < 1e-6);
        assert!((out[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_stereo_track_downmixes_to_mono_output() {
        let spec = hound::WavSpec {
            channels: 2,
            ..mono_spec(100)
        };
        // L = 0.5, R = 0.0
        let track = track_with_spec(spec, &[16384, 0, 16384, 0]);
        let mut voice = Voice::new(track, 100, true, 1.0);
        let tap = SampleTap::new(2);
        let mut out = [0.0f32; 2];

        voice.render(&mut out, 1, &mut tap.lock());

        assert_eq!(out, [0.25, 0.25]);
        let mut ordered = [0.0; 2];
        tap.lock().copy_ordered(&mut ordered);
        assert_eq!(ordered, [0.25, 0.25]);
    }

    #[test]
    fn test_stereo_track_keeps_channels_on_stereo_output() {
        let spec = hound::WavSpec {
            channels: 2,
            ..mono_spec(100)
        };
        let track = track_with_spec(spec, &[16384, 0]);
        let mut voice = Voice::new(track, 100, true, 1.0);
        let tap = SampleTap::new(1);
        let mut out = [0.0f32; 2];

        voice.render(&mut out, 2, &mut tap.lock());

        assert_eq!(out, [0.5, 0.0]);
        let mut ordered = [0.0; 1];
        tap.lock().copy_ordered(&mut ordered);
        assert_eq!(ordered, [0.25]);
    }

    #[test]
    fn test_loop_wraps_when_step_exceeds_track() {
        // 48 kHz track of one frame at 8 kHz output: six frames per step
        let track = track_of(&[16384], 48000);
        let mut voice = Voice::new(track, 8000, true, 1.0);
        let tap = SampleTap::new(4);
        let mut out = [0.0f32; 4];

        voice.render(&mut out, 1, &mut tap.lock());
        voice.render(&mut out, 1, &mut tap.lock());

        assert_eq!(out, [0.5; 4]);
        assert!(!voice.finished());
    }
}
