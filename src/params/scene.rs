//! Tunnel and torus-knot geometry parameters.

/// Tunnel made of nested wireframe tubes following the travel path
#[derive(Debug, Clone)]
pub struct TunnelConfig {
    /// One tube per color, innermost first (0xRRGGBB)
    pub colors: Vec<u32>,

    /// Radius of the innermost tube (world units)
    pub base_radius: f32,

    /// Radius added per tube
    pub radius_step: f32,

    /// Segments along the path
    pub tubular_segments: usize,

    /// Radial segments of the innermost tube; each tube adds one
    pub base_radial_segments: usize,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            colors: vec![0xf00000, 0xff0000, 0x00ff00, 0x0000ff],
            base_radius: 17.0,
            radius_step: 0.5,
            tubular_segments: 1000,
            base_radial_segments: 50,
        }
    }
}

impl TunnelConfig {
    /// Radius of tube `index`
    pub fn radius(&self, index: usize) -> f32 {
        self.base_radius + index as f32 * self.radius_step
    }

    /// Radial segment count of tube `index`
    pub fn radial_segments(&self, index: usize) -> usize {
        self.base_radial_segments + index
    }
}

/// Torus knot centrepiece
#[derive(Debug, Clone)]
pub struct KnotConfig {
    /// Radius of the knot curve
    pub radius: f32,

    /// Radius of the tube swept along the knot
    pub tube: f32,

    pub tubular_segments: usize,
    pub radial_segments: usize,

    /// Winds around its axis of rotational symmetry p times
    pub p: u32,

    /// Winds around the interior circle q times
    pub q: u32,

    /// Local rotation per frame about Z, then Y, then X (radians)
    pub spin_per_frame: f32,
}

impl Default for KnotConfig {
    fn default() -> Self {
        Self {
            radius: 2.0,
            tube: 0.4,
            tubular_segments: 150,
            radial_segments: 20,
            p: 3,
            q: 4,
            spin_per_frame: 0.01,
        }
    }
}

/// Convert 0xRRGGBB to [r, g, b] in 0..=1
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tube_radii_and_segments() {
        let tunnel = TunnelConfig::default();
        assert_eq!(tunnel.radius(0), 17.0);
        assert_eq!(tunnel.radius(3), 18.5);
        assert_eq!(tunnel.radial_segments(0), 50);
        assert_eq!(tunnel.radial_segments(3), 53);
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(hex_to_rgb(0x0000ff), [0.0, 0.0, 1.0]);
        let c = hex_to_rgb(0xf00000);
        assert!((c[0] - 240.0 / 255.0).abs() < 1e-6);
    }
}
