//! Byte-spectrum analyser fed by the playback thread.
//!
//! Mirrors the contract of a Web Audio analyser node: the most recent
//! `fft_size` samples are Blackman-windowed, transformed, smoothed over time
//! and mapped from a decibel range onto 0..=255 per bin.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::Result;
use crate::params::AnalyserConfig;

/// Anything that can hand out a per-frame magnitude snapshot
pub trait SpectrumSource {
    /// Length of every snapshot
    fn bin_count(&self) -> usize;

    /// Overwrite `out` with the current spectrum (one byte per bin).
    /// Must not block on audio I/O.
    fn fill_spectrum(&mut self, out: &mut [u8]);
}

/// Fixed-size ring of the most recent mono samples
#[derive(Debug)]
pub struct SampleRing {
    samples: Vec<f32>,
    write_pos: usize,
}

impl SampleRing {
    fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity],
            write_pos: 0,
        }
    }

    /// Append one sample, overwriting the oldest
    pub fn push(&mut self, sample: f32) {
        if self.samples.is_empty() {
            return;
        }
        self.samples[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.samples.len();
    }

    /// Copy the ring into `out`, oldest sample first
    pub(crate) fn copy_ordered(&self, out: &mut [f32]) {
        let (newer, older) = self.samples.split_at(self.write_pos);
        let n = older.len();
        out[..n].copy_from_slice(older);
        out[n..n + newer.len()].copy_from_slice(newer);
    }
}

/// Shared handle to the sample ring (audio thread writes, frame loop reads)
#[derive(Debug, Clone)]
pub struct SampleTap {
    ring: Arc<Mutex<SampleRing>>,
}

impl SampleTap {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Arc::new(Mutex::new(SampleRing::new(capacity))),
        }
    }

    /// Lock the ring for writing; a poisoned lock still yields the samples
    pub fn lock(&self) -> MutexGuard<'_, SampleRing> {
        self.ring.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Periodic Blackman window (alpha = 0.16), as the analyser node applies it
pub fn blackman_window(index: usize, size: usize) -> f32 {
    if size <= 1 {
        return 1.0;
    }
    let phase = 2.0 * PI * index as f32 / size as f32;
    0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
}

/// FFT analyser producing byte spectra from a [`SampleTap`]
pub struct SpectrumAnalyser {
    config: AnalyserConfig,
    tap: SampleTap,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    time_domain: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl SpectrumAnalyser {
    /// Create an analyser reading from `tap`; the tap must hold `fft_size` samples
    pub fn new(config: AnalyserConfig, tap: SampleTap) -> Result<Self> {
        config.validate()?;
        let size = config.fft_size;

        let fft = FftPlanner::new().plan_fft_forward(size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        let window = (0..size).map(|i| blackman_window(i, size)).collect();

        Ok(Self {
            fft,
            window,
            time_domain: vec![0.0; size],
            buffer: vec![Complex::new(0.0, 0.0); size],
            scratch,
            smoothed: vec![0.0; config.bin_count()],
            tap,
            config,
        })
    }

    /// Analyser with its own tap sized to the FFT window
    pub fn with_new_tap(config: AnalyserConfig) -> Result<Self> {
        let tap = SampleTap::new(config.fft_size);
        Self::new(config, tap)
    }

    pub fn tap(&self) -> &SampleTap {
        &self.tap
    }

    /// Run one analysis pass and update the smoothed magnitudes
    fn analyse(&mut self) {
        let size = self.config.fft_size;
        {
            let ring = self.tap.lock();
            if ring.samples.len() == size {
                ring.copy_ordered(&mut self.time_domain);
            } else {
                // Tap sized differently: take the newest `size` samples
                let mut all = vec![0.0; ring.samples.len()];
                ring.copy_ordered(&mut all);
                self.time_domain.fill(0.0);
                let take = all.len().min(size);
                self.time_domain[size - take..].copy_from_slice(&all[all.len() - take..]);
            }
        }

        for ((slot, sample), w) in self
            .buffer
            .iter_mut()
            .zip(&self.time_domain)
            .zip(&self.window)
        {
            *slot = Complex::new(sample * w, 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let tau = self.config.smoothing_time_constant;
        let norm = 1.0 / size as f32;
        for (smoothed, bin) in self.smoothed.iter_mut().zip(&self.buffer) {
            let magnitude = bin.norm() * norm;
            let next = tau * *smoothed + (1.0 - tau) * magnitude;
            // Keep NaN out of the recursion
            *smoothed = if next.is_finite() { next } else { 0.0 };
        }
    }

    /// Map a linear magnitude to the byte range
    fn magnitude_to_byte(&self, magnitude: f32) -> u8 {
        let min = self.config.min_decibels;
        let max = self.config.max_decibels;
        let db = 20.0 * magnitude.log10();
        let scaled = (255.0 / (max - min)) * (db - min);
        scaled.clamp(0.0, 255.0) as u8
    }
}

impl SpectrumSource for SpectrumAnalyser {
    fn bin_count(&self) -> usize {
        self.config.bin_count()
    }

    fn fill_spectrum(&mut self, out: &mut [u8]) {
        self.analyse();
        for (byte, magnitude) in out.iter_mut().zip(&self.smoothed) {
            *byte = self.magnitude_to_byte(*magnitude);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_sine(tap: &SampleTap, bin: usize, config: &AnalyserConfig, amplitude: f32) {
        let sample_rate = 44100.0;
        let freq = bin as f32 * sample_rate / config.fft_size as f32;
        let mut ring = tap.lock();
        for i in 0..config.fft_size {
            let t = i as f32 / sample_rate;
            ring.push(amplitude * (2.0 * PI * freq * t).sin());
        }
    }

    #[test]
    fn test_blackman_window() {
        let size = 1024;

        // Periodic window: 0 at the first sample, exactly 1 at size / 2
        assert!(blackman_window(0, size).abs() < 1e-6);
        assert!((blackman_window(size / 2, size) - 1.0).abs() < 1e-6);

        // Symmetric about size / 2, so the last sample mirrors index 1
        for i in [1, 100, 300] {
            assert!((blackman_window(i, size) - blackman_window(size - i, size)).abs() < 1e-5);
        }
        assert!((blackman_window(size - 1, size) - blackman_window(1, size)).abs() < 1e-6);
    }

    #[test]
    fn test_ring_orders_oldest_first() {
        let tap = SampleTap::new(4);
        {
            let mut ring = tap.lock();
            for s in 1..=6 {
                ring.push(s as f32);
            }
        }
        let mut out = [0.0; 4];
        tap.lock().copy_ordered(&mut out);
        assert_eq!(out, [3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_silence_is_all_zero() {
        let mut analyser = SpectrumAnalyser::with_new_tap(AnalyserConfig::default()).unwrap();
        let mut spectrum = vec![7u8; analyser.bin_count()];
        analyser.fill_spectrum(&mut spectrum);
        assert!(spectrum.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let config = AnalyserConfig {
            smoothing_time_constant: 0.0,
            ..AnalyserConfig::default()
        };
        let mut analyser = SpectrumAnalyser::with_new_tap(config.clone()).unwrap();
        feed_sine(analyser.tap(), 32, &config, 0.01);

        let mut spectrum = vec![0u8; analyser.bin_count()];
        analyser.fill_spectrum(&mut spectrum);

        let peak = spectrum
            .iter()
            .enumerate()
            .max_by_key(|&(_, b)| *b)
            .map(|(i, _)| i)
            .unwrap();
        assert!((31..=33).contains(&peak), "peak at bin {}", peak);
        assert!(spectrum[32] > 0);
        assert!(spectrum[400] < spectrum[32]);
    }

    #[test]
    fn test_smoothing_decays_instead_of_dropping() {
        let config = AnalyserConfig::default();
        let mut analyser = SpectrumAnalyser::with_new_tap(config.clone()).unwrap();
        let mut spectrum = vec![0u8; analyser.bin_count()];

        // Let the smoothed value settle on the tone
        feed_sine(analyser.tap(), 64, &config, 0.01);
        for _ in 0..50 {
            analyser.fill_spectrum(&mut spectrum);
        }
        let loud = spectrum[64];

        // Replace with silence: one frame later the bin is lower but not gone
        {
            let mut ring = analyser.tap().lock();
            for _ in 0..config.fft_size {
                ring.push(0.0);
            }
        }
        analyser.fill_spectrum(&mut spectrum);
        assert!(spectrum[64] < loud);
        assert!(spectrum[64] > 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalyserConfig {
            fft_size: 1000,
            ..AnalyserConfig::default()
        };
        assert!(SpectrumAnalyser::with_new_tap(config).is_err());
    }
}
