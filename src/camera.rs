//! Camera pose along the travel path: look-at plus accumulated barrel roll.

use glam::{Mat4, Quat, Vec3};

use crate::error::{Result, VisualizerError};
use crate::params::RenderConfig;

/// Camera placement for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    /// Point the camera looks at before the roll is applied
    pub target: Vec3,
    /// Roll about the viewing axis (radians), applied after the look-at
    pub roll: f32,
}

impl CameraPose {
    /// World-space orientation: look at the target with +Y up, then roll
    pub fn orientation(&self) -> Result<Quat> {
        // Looking at the eye itself has no direction and would yield NaN
        if self.eye.distance_squared(self.target) <= f32::EPSILON {
            return Err(VisualizerError::NonFinite {
                field: "camera.target",
                value: f32::NAN,
            });
        }
        // look_at_rh is the world→view rotation; the camera's orientation is its inverse
        let look = Quat::from_mat4(&Mat4::look_at_rh(Vec3::ZERO, self.target - self.eye, Vec3::Y));
        Ok((look.inverse() * Quat::from_rotation_z(self.roll)).normalize())
    }

    /// World → view transform
    pub fn view_matrix(&self) -> Result<Mat4> {
        let orientation = self.orientation()?;
        let view = Mat4::from_rotation_translation(orientation, self.eye).inverse();
        if !view.is_finite() {
            return Err(VisualizerError::NonFinite {
                field: "camera.view",
                value: f32::NAN,
            });
        }
        Ok(view)
    }
}

/// Perspective projection kept in sync with the display size
#[derive(Clone, Debug)]
pub struct CameraRig {
    config: RenderConfig,
}

impl CameraRig {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Update the aspect ratio after a resize
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.window_width = width;
        self.config.window_height = height;
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.config.aspect_ratio()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.config.fov_degrees.to_radians(),
            self.aspect_ratio(),
            self.config.near_plane,
            self.config.far_plane,
        )
    }

    /// Create view-projection matrix for rendering
    pub fn view_proj(&self, pose: &CameraPose) -> Result<Mat4> {
        Ok(self.projection_matrix() * pose.view_matrix()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(roll: f32) -> CameraPose {
        CameraPose {
            eye: Vec3::new(1.0, 2.0, 3.0),
            target: Vec3::new(1.0, 2.0, -7.0),
            roll,
        }
    }

    #[test]
    fn test_target_lands_on_view_axis() {
        for roll in [0.0, 0.7, 3.0] {
            let view = pose(roll).view_matrix().unwrap();
            let t = view.transform_point3(Vec3::new(1.0, 2.0, -7.0));
            // Camera looks down -Z in view space; roll does not move the target
            assert!(t.x.abs() < 1e-4 && t.y.abs() < 1e-4, "{:?}", t);
            assert!((t.z + 10.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_no_roll_matches_look_at() {
        let p = pose(0.0);
        let view = p.view_matrix().unwrap();
        let expected = Mat4::look_at_rh(p.eye, p.target, Vec3::Y);
        assert!(view.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_roll_rotates_up_vector() {
        let up = pose(std::f32::consts::FRAC_PI_2).orientation().unwrap() * Vec3::Y;
        // Looking down -Z, a quarter roll turns camera-up toward -X
        assert!(up.distance(Vec3::new(-1.0, 0.0, 0.0)) < 1e-4, "{:?}", up);
    }

    #[test]
    fn test_degenerate_pose_fails() {
        let p = CameraPose {
            eye: Vec3::ONE,
            target: Vec3::ONE,
            roll: 0.0,
        };
        assert!(p.view_matrix().is_err());
    }

    #[test]
    fn test_view_proj_matrix_generation() {
        let rig = CameraRig::new(RenderConfig::default());
        let view_proj = rig.view_proj(&pose(0.3)).unwrap();

        // Matrix should not be identity or zero
        assert_ne!(view_proj, Mat4::IDENTITY);
        assert_ne!(view_proj, Mat4::ZERO);
        assert!(view_proj.is_finite());
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut rig = CameraRig::new(RenderConfig::default());
        rig.resize(800, 800);
        assert!((rig.aspect_ratio() - 1.0).abs() < 1e-6);
    }
}
