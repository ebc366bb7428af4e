//! Scene objects: static tunnel, the shader-driven knot and the point light.
//!
//! Everything is created once; per frame only transforms, uniforms and the
//! light color change.

mod knot;
mod mesh;
mod tube;

pub use knot::torus_knot_mesh;
pub use mesh::{grid_indices, Mesh, Vertex};
pub use tube::{tube_mesh, tunnel_mesh, FrenetFrames};

use glam::{Mat4, Quat, Vec3};

use crate::mapping::{KnotUniforms, LightColor};
use crate::params::{KnotConfig, LightConfig, TunnelConfig};
use crate::path::CatmullRomCurve;

/// Static geometry uploaded once
#[derive(Clone, Debug)]
pub struct SceneMeshes {
    pub tunnel: Mesh,
    pub knot: Mesh,
}

impl SceneMeshes {
    pub fn build(curve: &CatmullRomCurve, tunnel: &TunnelConfig, knot: &KnotConfig) -> Self {
        Self {
            tunnel: tunnel_mesh(curve, tunnel),
            knot: torus_knot_mesh(knot),
        }
    }
}

/// Knot placement, mutated every frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KnotState {
    pub position: Vec3,
    pub rotation: Quat,
    /// Uniform scale on all axes
    pub scale: f32,
    pub uniforms: KnotUniforms,
}

impl Default for KnotState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
            uniforms: KnotUniforms::default(),
        }
    }
}

impl KnotState {
    /// Local rotation about Z, then Y, then X by `angle` each
    pub fn spin(&mut self, angle: f32) {
        self.rotation = (self.rotation
            * Quat::from_rotation_z(angle)
            * Quat::from_rotation_y(angle)
            * Quat::from_rotation_x(angle))
        .normalize();
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }
}

/// Point light with range falloff
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: LightColor,
    pub intensity: f32,
    pub distance: f32,
    pub decay: f32,
}

impl PointLight {
    pub fn new(config: &LightConfig) -> Self {
        let [r, g, b] = config.initial_color;
        Self {
            position: Vec3::ZERO,
            color: LightColor { r, g, b },
            intensity: config.intensity,
            distance: config.distance,
            decay: config.decay,
        }
    }
}

/// Mutable per-frame scene state
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneState {
    pub knot: KnotState,
    pub light: PointLight,
}

impl SceneState {
    pub fn new(light: &LightConfig) -> Self {
        Self {
            knot: KnotState::default(),
            light: PointLight::new(light),
        }
    }
}
