//! Band reduction and audio-reactive mapping coefficients.
//!
//! The defaults are artist-tuned values; they are not derived from anything.

use crate::error::{Result, VisualizerError};

/// How a partition mean is normalized before mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandNormalization {
    /// Mean of the partition, divided again by the partition length.
    /// The second division shapes the sensitivity curve the default
    /// coefficients were tuned against.
    #[default]
    MeanPerLength,

    /// Plain arithmetic mean of the partition
    Mean,
}

/// Band reduction configuration
#[derive(Debug, Clone, Default)]
pub struct BandConfig {
    pub normalization: BandNormalization,
}

/// Mapping from band scalars to light color, knot uniforms and knot scale
#[derive(Debug, Clone)]
pub struct ParameterMapping {
    /// light.r = high * this
    pub high_to_red: f32,

    /// light.g = mid * this
    pub mid_to_green: f32,

    /// light.b = low * this
    pub low_to_blue: f32,

    /// Shared mid contribution to all three amplitude uniforms
    pub mid_to_amplitude: f32,

    /// amplitude_x = mid * mid_to_amplitude + high * this
    pub high_to_amplitude_x: f32,

    /// amplitude_y = mid * mid_to_amplitude + high * this
    pub high_to_amplitude_y: f32,

    /// amplitude_z = mid * mid_to_amplitude + high * this
    pub high_to_amplitude_z: f32,

    /// normal_multiplier = bass / this
    pub bass_normal_divisor: f32,

    /// scale (all axes) = bass / this
    pub bass_scale_divisor: f32,
}

impl Default for ParameterMapping {
    fn default() -> Self {
        Self {
            high_to_red: 50.0,
            mid_to_green: 10.0,
            low_to_blue: 5.0,
            mid_to_amplitude: 5.0,
            high_to_amplitude_x: 20.0,
            high_to_amplitude_y: -30.0,
            high_to_amplitude_z: -10.0,
            bass_normal_divisor: -100.0,
            bass_scale_divisor: 100.0,
        }
    }
}

impl ParameterMapping {
    /// Validate configuration (coefficients finite, divisors non-zero)
    pub fn validate(&self) -> Result<()> {
        let coefficients = [
            self.high_to_red,
            self.mid_to_green,
            self.low_to_blue,
            self.mid_to_amplitude,
            self.high_to_amplitude_x,
            self.high_to_amplitude_y,
            self.high_to_amplitude_z,
            self.bass_normal_divisor,
            self.bass_scale_divisor,
        ];
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(VisualizerError::InvalidConfig(
                "mapping coefficients must be finite".to_string(),
            ));
        }
        if self.bass_normal_divisor == 0.0 || self.bass_scale_divisor == 0.0 {
            return Err(VisualizerError::InvalidConfig(
                "bass divisors must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
