//! Mesh data structures for block rendering.
//!
//! A [`Mesh`] is a flat vertex list plus a triangle index list, built one quad
//! at a time and uploaded to the GPU as a single pair of buffers.

use std::mem::size_of;

use cgmath::Vector3;

use super::face::Face;
use crate::engine_state::rendering::{atlas::TileUv, Vertex};

/// Triangle indices of a quad relative to its first vertex.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Vertices emitted per quad.
pub const VERTICES_PER_QUAD: usize = 4;

/// Indices emitted per quad.
pub const INDICES_PER_QUAD: usize = QUAD_INDICES.len();

/// Bytes of vertex data per quad, the larger of a quad's two buffer shares.
pub const VERTEX_BYTES_PER_QUAD: u64 = (VERTICES_PER_QUAD * size_of::<Vertex>()) as u64;

/// CPU-side geometry ready for upload.
///
/// Every quad owns four consecutive vertices and six consecutive indices, so
/// `indices.len() == 6 * vertices.len() / 4` always holds.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Mesh {
    /// The vertex data
    pub vertices: Vec<Vertex>,
    /// The index data, two triangles per quad
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Creates a new, empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mesh with room for `quads` quads.
    pub fn with_quad_capacity(quads: usize) -> Self {
        Mesh {
            vertices: Vec::with_capacity(quads * VERTICES_PER_QUAD),
            indices: Vec::with_capacity(quads * INDICES_PER_QUAD),
        }
    }

    /// Appends one quad.
    ///
    /// # Arguments
    /// * `face` - Corner positions and side of the quad
    /// * `color` - Flat colour of all four vertices
    /// * `uv` - Atlas rectangle mapped onto the corners in winding order
    pub fn push_quad(&mut self, face: &Face, color: Vector3<f32>, uv: TileUv) {
        let base = self.vertices.len() as u32;
        let normal = face.normal();

        for (corner, tex_coords) in face.corners.iter().zip(uv.corners()) {
            self.vertices
                .push(Vertex::new(*corner, normal, color, tex_coords));
        }
        self.indices
            .extend(QUAD_INDICES.iter().map(|index| base + index));
    }

    /// Number of quads in the mesh.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD
    }

    /// Number of indices in the mesh.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Size of the vertex buffer this mesh needs, in bytes.
    pub fn vertex_buffer_size(&self) -> u64 {
        (self.vertices.len() * size_of::<Vertex>()) as u64
    }

    /// Size of the index buffer this mesh needs, in bytes.
    pub fn index_buffer_size(&self) -> u64 {
        (self.indices.len() * size_of::<u32>()) as u64
    }

    /// Whether both buffers fit a device whose largest buffer is `max_buffer_size` bytes.
    pub fn fits_buffer_limit(&self, max_buffer_size: u64) -> bool {
        self.vertex_buffer_size() <= max_buffer_size && self.index_buffer_size() <= max_buffer_size
    }

    /// Whether the mesh has no geometry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_side::BlockSide;

    #[test]
    fn quads_use_consecutive_vertex_ranges() {
        let mut mesh = Mesh::new();
        let face = Face::new(Vector3::new(0.0, 0.0, 0.0), BlockSide::TOP);
        mesh.push_quad(&face, Vector3::new(1.0, 1.0, 1.0), TileUv::FULL);
        mesh.push_quad(&face, Vector3::new(1.0, 1.0, 1.0), TileUv::FULL);

        assert_eq!(mesh.quad_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4]);
    }

    #[test]
    fn quad_vertices_carry_face_attributes() {
        let mut mesh = Mesh::new();
        let face = Face::new(Vector3::new(0.0, 0.0, 0.0), BlockSide::EAST);
        let uv = TileUv {
            u0: 0.25,
            v0: 0.5,
            u1: 0.5,
            v1: 0.75,
        };
        mesh.push_quad(&face, Vector3::new(0.2, 0.4, 0.6), uv);

        let uvs: Vec<[f32; 2]> = mesh.vertices.iter().map(|vertex| vertex.uv).collect();
        assert_eq!(uvs, vec![[0.25, 0.5], [0.5, 0.5], [0.5, 0.75], [0.25, 0.75]]);
        for vertex in &mesh.vertices {
            assert_eq!(vertex.normal, [1.0, 0.0, 0.0]);
            assert_eq!(vertex.color, [0.2, 0.4, 0.6]);
        }
    }

    #[test]
    fn buffer_sizes_follow_vertex_layout() {
        let mut mesh = Mesh::new();
        let face = Face::new(Vector3::new(0.0, 0.0, 0.0), BlockSide::TOP);
        mesh.push_quad(&face, Vector3::new(1.0, 1.0, 1.0), TileUv::FULL);

        assert_eq!(mesh.vertex_buffer_size(), VERTEX_BYTES_PER_QUAD);
        assert_eq!(mesh.vertex_buffer_size(), 4 * 44);
        assert_eq!(mesh.index_buffer_size(), 6 * 4);
        assert!(mesh.fits_buffer_limit(176));
        assert!(!mesh.fits_buffer_limit(175));
    }

    #[test]
    fn new_mesh_is_empty() {
        let mesh = Mesh::with_quad_capacity(8);
        assert!(mesh.is_empty());
        assert_eq!(mesh.index_count(), 0);
    }
}
