//! Vertex data structures and layouts for block rendering.
//!
//! This module defines the vertex format produced by the mesher and consumed by
//! the block shader.

use cgmath::Vector3;

/// A vertex in the block rendering pipeline.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Normal: [f32; 3] (12 bytes)
/// - Colour: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
///
/// Total size: 44 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Unit face normal
    pub normal: [f32; 3],
    /// Flat colour used when no atlas is bound
    pub color: [f32; 3],
    /// Atlas texture coordinates
    pub uv: [f32; 2],
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `position` - Position in world space
    /// * `normal` - Unit face normal
    /// * `color` - Flat RGB colour
    /// * `uv` - Atlas texture coordinates
    pub fn new(
        position: Vector3<f32>,
        normal: Vector3<f32>,
        color: Vector3<f32>,
        uv: [f32; 2],
    ) -> Self {
        Vertex {
            position: position.into(),
            normal: normal.into(),
            color: color.into(),
            uv,
        }
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: normal (vec3<f32>)
    /// - `location = 2`: color (vec3<f32>)
    /// - `location = 3`: uv (vec2<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 9]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_struct_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 44);
        let layout = Vertex::desc();
        assert_eq!(layout.array_stride, 44);
        let last = layout.attributes[layout.attributes.len() - 1];
        assert_eq!(last.offset, 36);
    }

    #[test]
    fn vertex_is_plain_bytes() {
        let vertex = Vertex::new(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::unit_y(),
            Vector3::new(0.5, 0.5, 0.5),
            [0.25, 0.75],
        );
        let bytes: &[u8] = bytemuck::bytes_of(&vertex);
        assert_eq!(bytes.len(), 44);
        assert_eq!(&bytes[0..4], &1.0f32.to_ne_bytes());
    }
}
