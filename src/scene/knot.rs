//! Torus knot centrepiece geometry.

use glam::Vec3;
use std::f32::consts::TAU;

use super::mesh::{grid_indices, Mesh, Vertex};
use crate::params::KnotConfig;

/// Point on the (p, q) torus knot curve at angle `u`
fn knot_curve(u: f32, p: f32, q: f32, radius: f32) -> Vec3 {
    let cu = u.cos();
    let su = u.sin();
    let qu_over_p = q / p * u;
    let cs = qu_over_p.cos();

    Vec3::new(
        radius * (2.0 + cs) * 0.5 * cu,
        radius * (2.0 + cs) * su * 0.5,
        radius * qu_over_p.sin() * 0.5,
    )
}

/// Tube swept along a (p, q) torus knot
pub fn torus_knot_mesh(config: &KnotConfig) -> Mesh {
    let p = config.p as f32;
    let q = config.q as f32;
    let tubular = config.tubular_segments;
    let radial = config.radial_segments;

    let mut vertices = Vec::with_capacity((tubular + 1) * (radial + 1));

    for i in 0..=tubular {
        let u = i as f32 / tubular as f32 * p * TAU;

        // Approximate frame from the curve and a point slightly ahead
        let p1 = knot_curve(u, p, q, config.radius);
        let p2 = knot_curve(u + 0.01, p, q, config.radius);
        let tangent = p2 - p1;
        let mut normal = p2 + p1;
        let binormal = tangent.cross(normal);
        normal = binormal.cross(tangent);
        let binormal = binormal.normalize();
        let normal = normal.normalize();

        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            let cx = -config.tube * v.cos();
            let cy = config.tube * v.sin();

            let position = p1 + cx * normal + cy * binormal;
            let surface_normal = (position - p1).normalize();
            vertices.push(Vertex {
                position: position.to_array(),
                normal: surface_normal.to_array(),
                color: [i as f32 / tubular as f32, j as f32 / radial as f32, 0.0],
            });
        }
    }

    Mesh {
        vertices,
        indices: grid_indices(tubular, radial),
    }
}
