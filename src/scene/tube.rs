//! Tunnel tubes swept along the travel curve.

use glam::{Quat, Vec3};
use std::f32::consts::TAU;

use super::mesh::{grid_indices, Mesh, Vertex};
use crate::params::{hex_to_rgb, TunnelConfig};
use crate::path::CatmullRomCurve;

/// Moving frame along a curve (one entry per tubular segment boundary)
#[derive(Clone, Debug)]
pub struct FrenetFrames {
    pub tangents: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub binormals: Vec<Vec3>,
}

impl FrenetFrames {
    /// Parallel-transport frames; on a closed curve the accumulated twist
    /// is spread over the loop so the first and last frames line up.
    pub fn compute(curve: &CatmullRomCurve, segments: usize, closed: bool) -> Self {
        let tangents: Vec<Vec3> = (0..=segments)
            .map(|i| curve.tangent_at(i as f32 / segments as f32))
            .collect();

        let mut normals = vec![Vec3::ZERO; segments + 1];
        let mut binormals = vec![Vec3::ZERO; segments + 1];

        // Initial normal: the axis least aligned with the first tangent
        let t0 = tangents[0];
        let abs = t0.abs();
        let mut min = f32::MAX;
        let mut axis = Vec3::X;
        if abs.x <= min {
            min = abs.x;
            axis = Vec3::X;
        }
        if abs.y <= min {
            min = abs.y;
            axis = Vec3::Y;
        }
        if abs.z <= min {
            axis = Vec3::Z;
        }
        let side = t0.cross(axis).normalize();
        normals[0] = t0.cross(side);
        binormals[0] = t0.cross(normals[0]);

        for i in 1..=segments {
            normals[i] = normals[i - 1];
            let axis = tangents[i - 1].cross(tangents[i]);
            if axis.length() > f32::EPSILON {
                let theta = tangents[i - 1].dot(tangents[i]).clamp(-1.0, 1.0).acos();
                normals[i] = Quat::from_axis_angle(axis.normalize(), theta) * normals[i];
            }
            binormals[i] = tangents[i].cross(normals[i]);
        }

        if closed && segments > 0 {
            let mut theta = normals[0].dot(normals[segments]).clamp(-1.0, 1.0).acos();
            theta /= segments as f32;
            if tangents[0].dot(normals[0].cross(normals[segments])) > 0.0 {
                theta = -theta;
            }
            for i in 1..=segments {
                normals[i] = Quat::from_axis_angle(tangents[i], theta * i as f32) * normals[i];
                binormals[i] = tangents[i].cross(normals[i]);
            }
        }

        Self {
            tangents,
            normals,
            binormals,
        }
    }
}

/// Build one closed tube of `radius` around `curve`
pub fn tube_mesh(
    curve: &CatmullRomCurve,
    frames: &FrenetFrames,
    tubular_segments: usize,
    radius: f32,
    radial_segments: usize,
    color: [f32; 3],
) -> Mesh {
    let mut vertices = Vec::with_capacity((tubular_segments + 1) * (radial_segments + 1));

    // Last ring repeats the first so the seam closes exactly
    for i in 0..=tubular_segments {
        let ring = if i == tubular_segments { 0 } else { i };
        let center = curve.point_at(ring as f32 / tubular_segments as f32);
        let n = frames.normals[ring];
        let b = frames.binormals[ring];

        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            let normal = (-v.cos() * n + v.sin() * b).normalize();
            vertices.push(Vertex {
                position: (center + radius * normal).to_array(),
                normal: normal.to_array(),
                color,
            });
        }
    }

    Mesh {
        vertices,
        indices: grid_indices(tubular_segments, radial_segments),
    }
}

/// All tunnel tubes merged into one mesh, innermost first
pub fn tunnel_mesh(curve: &CatmullRomCurve, config: &TunnelConfig) -> Mesh {
    let frames = FrenetFrames::compute(curve, config.tubular_segments, true);
    let mut tunnel = Mesh::default();
    for (index, &hex) in config.colors.iter().enumerate() {
        let tube = tube_mesh(
            curve,
            &frames,
            config.tubular_segments,
            config.radius(index),
            config.radial_segments(index),
            hex_to_rgb(hex),
        );
        tunnel.append(&tube);
    }
    log::debug!(
        "Tunnel: {} tubes, {} vertices, {} triangles",
        config.colors.len(),
        tunnel.vertices.len(),
        tunnel.triangle_count()
    );
    tunnel
}
