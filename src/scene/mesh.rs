//! Vertex layout and mesh containers shared by the tunnel and the knot.

use bytemuck::{Pod, Zeroable};
use std::collections::HashSet;

/// Vertex data (position + normal + color)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

/// Indexed triangle mesh
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    /// Triangle list, counter-clockwise
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Unique triangle edges as a line list (for wireframe drawing)
    pub fn wireframe_indices(&self) -> Vec<u32> {
        let mut seen = HashSet::with_capacity(self.indices.len());
        let mut lines = Vec::with_capacity(self.indices.len() * 2);
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    lines.extend_from_slice(&[key.0, key.1]);
                }
            }
        }
        lines
    }

    /// Append another mesh, offsetting its indices
    pub fn append(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }
}

/// Grid triangulation shared by swept-tube meshes.
///
/// Vertices are laid out in `rows + 1` rings of `cols + 1` vertices; each cell
/// becomes two counter-clockwise triangles.
pub fn grid_indices(rows: usize, cols: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(rows * cols * 6);
    let stride = cols + 1;
    for j in 1..=rows {
        for i in 1..=cols {
            let a = (stride * (j - 1) + (i - 1)) as u32;
            let b = (stride * j + (i - 1)) as u32;
            let c = (stride * j + i) as u32;
            let d = (stride * (j - 1) + i) as u32;

            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_indices_count() {
        let indices = grid_indices(4, 3);
        assert_eq!(indices.len(), 4 * 3 * 6);
        assert!(indices.iter().all(|&i| (i as usize) < 5 * 4));
    }

    #[test]
    fn test_wireframe_deduplicates_shared_edges() {
        // Two triangles sharing one edge: 5 unique edges
        let mesh = Mesh {
            vertices: vec![Vertex::zeroed(); 4],
            indices: vec![0, 1, 2, 2, 1, 3],
        };
        let lines = mesh.wireframe_indices();
        assert_eq!(lines.len(), 5 * 2);
    }

    #[test]
    fn test_append_offsets_indices() {
        let mut a = Mesh {
            vertices: vec![Vertex::zeroed(); 3],
            indices: vec![0, 1, 2],
        };
        let b = a.clone();
        a.append(&b);
        assert_eq!(a.vertices.len(), 6);
        assert_eq!(a.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(a.triangle_count(), 2);
    }
}
