//! Rendering and lighting configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (world units)
    pub near_plane: f32,

    /// Far clipping plane (world units)
    pub far_plane: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fov_degrees: 45.0,
            near_plane: 0.001,
            far_plane: 1000.0,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }
}

/// Point light travelling ahead of the camera
#[derive(Debug, Clone)]
pub struct LightConfig {
    /// Color before the first frame is mapped
    pub initial_color: [f32; 3],

    pub intensity: f32,

    /// Range after which the light contributes nothing (world units)
    pub distance: f32,

    /// Falloff exponent within `distance`
    pub decay: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            initial_color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            distance: 500.0,
            decay: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio() {
        let mut config = RenderConfig::default();
        assert!((config.aspect_ratio() - 1280.0 / 720.0).abs() < 1e-6);

        // Minimized window must not divide by zero
        config.window_height = 0;
        assert!(config.aspect_ratio().is_finite());
    }
}
