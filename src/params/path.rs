//! Travel path configuration.

use crate::error::{Result, VisualizerError};

/// Control points of the closed travel curve (world units).
/// Traced from a spline modelled by hand; order matters.
pub const TUNNEL_CONTROL_POINTS: [[f32; 3]; 18] = [
    [-524.88, -25.21, 214.648],
    [315.141, -25.21, 427.673],
    [331.907, 192.90, -85.979],
    [-154.46, 202.78, 38.9500],
    [-214.58, -27.21, 28.8203],
    [-192.57, -25.21, -189.30],
    [166.098, 124.81, -430.27],
    [141.223, -25.21, 356.477],
    [-222.28, -201.5, 161.434],
    [-512.38, -25.21, -277.68],
    [528.427, 119.89, 182.375],
    [248.499, -55.88, -265.27],
    [83.7028, -18.67, -328.71],
    [-162.66, -18.46, -319.10],
    [-183.38, -18.64, -318.71],
    [-305.01, -25.21, -316.32],
    [-488.45, 41.412, -324.00],
    [-346.18, -142.0, -51.634],
];

/// Knot spacing of the Catmull-Rom spline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveType {
    /// Uniform parameter spacing
    Uniform,
    /// Spacing by the square root of the chord length
    Centripetal,
    /// Spacing by the chord length
    #[default]
    Chordal,
}

impl CurveType {
    /// Exponent applied to the squared distance between neighbouring points
    pub fn squared_distance_exponent(self) -> Option<f32> {
        match self {
            CurveType::Uniform => None,
            CurveType::Centripetal => Some(0.25),
            CurveType::Chordal => Some(0.5),
        }
    }
}

/// Path travel parameters
#[derive(Debug, Clone)]
pub struct PathConfig {
    /// Control points of the closed curve
    pub control_points: Vec<[f32; 3]>,

    /// Spline knot spacing
    pub curve_type: CurveType,

    /// Samples used to build the arc-length table
    pub arc_length_divisions: usize,

    /// Progress added per frame (fraction of the whole loop)
    pub step_per_frame: f64,

    /// Lead of the knot ahead of the camera (fraction of the loop)
    pub knot_offset: f64,

    /// Lead of the light ahead of the camera (fraction of the loop)
    pub light_offset: f64,

    /// Camera roll in radians per unit of accumulated progress
    pub roll_per_progress: f64,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            control_points: TUNNEL_CONTROL_POINTS.to_vec(),
            curve_type: CurveType::Chordal,
            arc_length_divisions: 200,
            step_per_frame: 0.0001,
            knot_offset: 0.005,
            light_offset: 0.01,
            roll_per_progress: 20.0,
        }
    }
}

impl PathConfig {
    /// Validate configuration (enough points, positive step, etc.)
    pub fn validate(&self) -> Result<()> {
        if self.control_points.len() < 2 {
            return Err(VisualizerError::InvalidConfig(format!(
                "path needs at least 2 control points, got {}",
                self.control_points.len()
            )));
        }
        if self.arc_length_divisions == 0 {
            return Err(VisualizerError::InvalidConfig(
                "arc_length_divisions must be > 0".to_string(),
            ));
        }
        if !(self.step_per_frame.is_finite() && self.step_per_frame >= 0.0) {
            return Err(VisualizerError::InvalidConfig(format!(
                "step_per_frame must be finite and >= 0, got {}",
                self.step_per_frame
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_config() {
        let config = PathConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.control_points.len(), 18);
        assert_eq!(config.curve_type.squared_distance_exponent(), Some(0.5));
    }

    #[test]
    fn test_path_config_rejects_degenerate() {
        let mut config = PathConfig::default();
        config.control_points.truncate(1);
        assert!(config.validate().is_err());

        let mut config = PathConfig::default();
        config.step_per_frame = -0.1;
        assert!(config.validate().is_err());
    }
}
