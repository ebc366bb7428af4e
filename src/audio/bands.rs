//! Reduction of a byte spectrum to four band scalars.

use std::ops::Range;

use crate::params::{BandConfig, BandNormalization};

/// Reduced energy per frequency sub-range, recomputed every frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandScalars {
    /// Narrow sliver at the very bottom of the spectrum
    pub bass: f32,
    /// Lower third
    pub low: f32,
    /// Middle third
    pub mid: f32,
    /// Upper third
    pub high: f32,
}

/// Bin ranges of the four partitions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BandLayout {
    pub bass: Range<usize>,
    pub low: Range<usize>,
    pub mid: Range<usize>,
    pub high: Range<usize>,
}

impl BandLayout {
    /// Partition a snapshot of `len` bins.
    ///
    /// Fractional bounds are truncated toward zero and every third drops its
    /// last bin; the last bin of the snapshot belongs to no partition.
    pub fn for_bin_count(len: usize) -> Self {
        let n = len as f64;
        let third = n / 3.0;
        let bound = |x: f64| x.max(0.0).trunc() as usize;

        Self {
            bass: 0..bound(n / 200.0),
            low: 0..bound(third - 1.0),
            mid: bound(third)..bound(third * 2.0 - 1.0),
            high: bound(third * 2.0)..len.saturating_sub(1),
        }
    }

    /// Same range clamped to a snapshot of `len` bins (never inverted)
    fn clamp(range: &Range<usize>, len: usize) -> Range<usize> {
        let end = range.end.min(len);
        range.start.min(end)..end
    }
}

/// Band reducer: partitions a snapshot and reduces each partition to a scalar
#[derive(Clone, Debug, Default)]
pub struct BandReducer {
    config: BandConfig,
    /// Fixed partition layout; derived from the snapshot length when absent
    layout: Option<BandLayout>,
}

impl BandReducer {
    pub fn new(config: BandConfig) -> Self {
        Self {
            config,
            layout: None,
        }
    }

    /// Use explicit partitions instead of the thirds of the snapshot
    pub fn with_layout(mut self, layout: BandLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn layout_for(&self, len: usize) -> BandLayout {
        self.layout
            .clone()
            .unwrap_or_else(|| BandLayout::for_bin_count(len))
    }

    /// Reduce one snapshot
    pub fn reduce(&self, snapshot: &[u8]) -> BandScalars {
        let layout = self.layout_for(snapshot.len());
        let reduce = |range: &Range<usize>| {
            let part = &snapshot[BandLayout::clamp(range, snapshot.len())];
            reduce_partition(part, self.config.normalization)
        };

        BandScalars {
            bass: reduce(&layout.bass),
            low: reduce(&layout.low),
            mid: reduce(&layout.mid),
            high: reduce(&layout.high),
        }
    }
}

/// Mean of a partition, optionally divided again by its length.
/// An empty partition reduces to 0.
pub fn reduce_partition(part: &[u8], normalization: BandNormalization) -> f32 {
    if part.is_empty() {
        return 0.0;
    }
    let len = part.len() as f32;
    let mean = part.iter().map(|&b| b as f32).sum::<f32>() / len;
    match normalization {
        BandNormalization::MeanPerLength => mean / len,
        BandNormalization::Mean => mean,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_of_hundreds() -> BandLayout {
        BandLayout {
            bass: 0..100,
            low: 0..100,
            mid: 100..200,
            high: 200..300,
        }
    }

    #[test]
    fn test_layout_for_default_bin_count() {
        let layout = BandLayout::for_bin_count(512);
        assert_eq!(layout.bass, 0..2);
        assert_eq!(layout.low, 0..169);
        assert_eq!(layout.mid, 170..340);
        assert_eq!(layout.high, 341..511);
    }

    #[test]
    fn test_layout_for_tiny_snapshots() {
        let layout = BandLayout::for_bin_count(0);
        assert!(layout.bass.is_empty());
        assert!(layout.low.is_empty());
        assert!(layout.mid.is_empty());
        assert!(layout.high.is_empty());

        let layout = BandLayout::for_bin_count(2);
        assert!(layout.low.is_empty());
        assert!(layout.high.start <= layout.high.end);
    }

    #[test]
    fn test_all_zero_snapshot() {
        let reducer = BandReducer::default();
        let bands = reducer.reduce(&[0u8; 512]);
        assert_eq!(bands, BandScalars::default());
    }

    #[test]
    fn test_all_max_with_partitions_of_hundred() {
        let reducer = BandReducer::default().with_layout(layout_of_hundreds());
        let bands = reducer.reduce(&[255u8; 300]);
        for value in [bands.bass, bands.low, bands.mid, bands.high] {
            assert!((value - 2.55).abs() < 1e-5, "got {}", value);
        }
    }

    #[test]
    fn test_derived_thirds_of_hundred() {
        // 303 bins: each third keeps exactly 100 bins, bass sliver keeps 1
        let bands = BandReducer::default().reduce(&[255u8; 303]);
        assert!((bands.low - 2.55).abs() < 1e-5);
        assert!((bands.mid - 2.55).abs() < 1e-5);
        assert!((bands.high - 2.55).abs() < 1e-5);
        assert!((bands.bass - 255.0).abs() < 1e-3);
    }

    #[test]
    fn test_single_normalization() {
        let reducer = BandReducer::new(BandConfig {
            normalization: BandNormalization::Mean,
        })
        .with_layout(layout_of_hundreds());
        let bands = reducer.reduce(&[255u8; 300]);
        assert!((bands.high - 255.0).abs() < 1e-3);
    }

    #[test]
    fn test_empty_partition_is_zero_not_nan() {
        // 100 bins: bass sliver is 0..0
        let bands = BandReducer::default().reduce(&[200u8; 100]);
        assert_eq!(bands.bass, 0.0);
        assert!(bands.low > 0.0);

        // Layout pointing past the snapshot is clamped
        let reducer = BandReducer::default().with_layout(BandLayout {
            bass: 50..80,
            low: 0..10,
            mid: 10..20,
            high: 20..30,
        });
        let bands = reducer.reduce(&[9u8; 10]);
        assert_eq!(bands.bass, 0.0);
        assert_eq!(bands.mid, 0.0);
        assert!((bands.low - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_outputs_non_negative_and_finite() {
        let reducer = BandReducer::default();
        for seed in 0..32u32 {
            let snapshot: Vec<u8> = (0..512u32)
                .map(|i| (i.wrapping_mul(2654435761).wrapping_add(seed * 97) >> 24) as u8)
                .collect();
            let bands = reducer.reduce(&snapshot);
            for value in [bands.bass, bands.low, bands.mid, bands.high] {
                assert!(value.is_finite());
                assert!(value >= 0.0);
            }
        }
    }
}
