//! Cyclic progress along the travel curve.

use glam::Vec3;

use super::curve::CatmullRomCurve;
use crate::error::Result;
use crate::params::PathConfig;

/// The three points sampled each frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathSample {
    /// Camera position (at progress)
    pub camera: Vec3,
    /// Knot position (slightly ahead)
    pub knot: Vec3,
    /// Light position (further ahead)
    pub light: Vec3,
}

/// Advances progress by a fixed step and samples the curve with lookahead.
///
/// The knot and the light lead the camera so the scene carries a sense of
/// direction without computing tangents.
#[derive(Clone, Debug)]
pub struct PathSampler {
    curve: CatmullRomCurve,
    /// Accumulated progress (never wrapped)
    accumulated: f64,
    step: f64,
    knot_offset: f64,
    light_offset: f64,
}

impl PathSampler {
    pub fn new(config: &PathConfig) -> Result<Self> {
        config.validate()?;
        let curve = CatmullRomCurve::new(
            &config.control_points,
            config.curve_type,
            config.arc_length_divisions,
        )?;
        Ok(Self {
            curve,
            accumulated: 0.0,
            step: config.step_per_frame,
            knot_offset: config.knot_offset,
            light_offset: config.light_offset,
        })
    }

    pub fn curve(&self) -> &CatmullRomCurve {
        &self.curve
    }

    /// Total progress added so far
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    /// Progress wrapped into [0, 1)
    pub fn progress(&self) -> f64 {
        wrap_unit(self.accumulated)
    }

    /// Add one frame's step
    pub fn advance(&mut self) {
        self.accumulated += self.step;
    }

    /// Point at arc-length fraction `progress`, wrapped into [0, 1)
    pub fn point_at(&self, progress: f64) -> Vec3 {
        self.curve.point_at(wrap_unit(progress) as f32)
    }

    /// Sample camera, knot and light positions at the current progress
    pub fn sample(&self) -> PathSample {
        let p = self.accumulated;
        PathSample {
            camera: self.point_at(p),
            knot: self.point_at(p + self.knot_offset),
            light: self.point_at(p + self.light_offset),
        }
    }

    /// Advance one frame, then sample
    pub fn advance_and_sample(&mut self) -> PathSample {
        self.advance();
        self.sample()
    }
}

/// `value mod 1` in [0, 1), also for negative input
pub fn wrap_unit(value: f64) -> f64 {
    let wrapped = value.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative input
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}
