//! Parameter mapper: band scalars to light color, knot uniforms and knot scale.

use crate::audio::BandScalars;
use crate::error::{ensure_finite, Result};
use crate::params::ParameterMapping;

/// Point-light color (unclamped; values above 1 over-drive the light)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LightColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl LightColor {
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// Uniform inputs of the knot deformation shader
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KnotUniforms {
    pub amplitude_x: f32,
    pub amplitude_y: f32,
    pub amplitude_z: f32,
    pub normal_multiplier: f32,
}

impl KnotUniforms {
    /// Build uniforms, rejecting NaN and infinities
    pub fn new(
        amplitude_x: f32,
        amplitude_y: f32,
        amplitude_z: f32,
        normal_multiplier: f32,
    ) -> Result<Self> {
        Ok(Self {
            amplitude_x: ensure_finite("uniforms.amplitude_x", amplitude_x)?,
            amplitude_y: ensure_finite("uniforms.amplitude_y", amplitude_y)?,
            amplitude_z: ensure_finite("uniforms.amplitude_z", amplitude_z)?,
            normal_multiplier: ensure_finite("uniforms.normal_multiplier", normal_multiplier)?,
        })
    }

    pub fn to_array(self) -> [f32; 4] {
        [
            self.amplitude_x,
            self.amplitude_y,
            self.amplitude_z,
            self.normal_multiplier,
        ]
    }
}

/// Everything the audio drives in one frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderParams {
    pub light_color: LightColor,
    pub uniforms: KnotUniforms,
    /// Uniform scale on all three knot axes
    pub knot_scale: f32,
}

/// Pure mapping from band scalars to [`RenderParams`]
#[derive(Clone, Debug, Default)]
pub struct ParameterMapper {
    mapping: ParameterMapping,
}

impl ParameterMapper {
    pub fn new(mapping: ParameterMapping) -> Result<Self> {
        mapping.validate()?;
        Ok(Self { mapping })
    }

    /// Map one frame of band scalars
    pub fn map(&self, bands: &BandScalars) -> Result<RenderParams> {
        let m = &self.mapping;

        let light_color = LightColor {
            r: ensure_finite("light.r", bands.high * m.high_to_red)?,
            g: ensure_finite("light.g", bands.mid * m.mid_to_green)?,
            b: ensure_finite("light.b", bands.low * m.low_to_blue)?,
        };

        let mid = bands.mid * m.mid_to_amplitude;
        let uniforms = KnotUniforms::new(
            mid + bands.high * m.high_to_amplitude_x,
            mid + bands.high * m.high_to_amplitude_y,
            mid + bands.high * m.high_to_amplitude_z,
            bands.bass / m.bass_normal_divisor,
        )?;

        let knot_scale = ensure_finite("knot.scale", bands.bass / m.bass_scale_divisor)?;

        Ok(RenderParams {
            light_color,
            uniforms,
            knot_scale,
        })
    }
}
