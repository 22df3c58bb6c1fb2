//! Meshing renderer module for the voxel engine.
//!
//! This module owns the block render pipeline and the GPU buffers of a built
//! mesh. The whole plane is drawn with a single indexed draw call.

use log::{debug, warn};
use wgpu::{util::DeviceExt, Buffer, Device, RenderPass, RenderPipeline, TextureFormat};

use super::Mesh;
use crate::engine_state::rendering::{
    bind_group_state::BindGroupState, RenderError, Vertex,
};

/// GPU copy of a [`Mesh`].
///
/// Buffers are sized exactly to the mesh and released when this value is
/// dropped. Rebuilding uploads a new `MeshBuffers` and drops the old one.
pub struct MeshBuffers {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    index_count: u32,
}

impl MeshBuffers {
    /// Uploads a mesh.
    ///
    /// Both buffers are created inside a validation error scope, and a mesh
    /// that does not fit the device's buffer limit is never handed to wgpu.
    ///
    /// # Returns
    /// `None` for an empty mesh, which has nothing to draw, or for a mesh the
    /// device cannot hold
    pub fn upload(device: &Device, mesh: &Mesh) -> Option<Self> {
        if mesh.is_empty() {
            return None;
        }

        let max_buffer_size = device.limits().max_buffer_size;
        if !mesh.fits_buffer_limit(max_buffer_size) {
            warn!(
                "Mesh needs a {} byte vertex buffer, device allows {max_buffer_size}; nothing uploaded",
                mesh.vertex_buffer_size()
            );
            return None;
        }
        let Ok(index_count) = u32::try_from(mesh.indices.len()) else {
            warn!("Mesh has {} indices, more than 32-bit indices can address", mesh.indices.len());
            return None;
        };

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plane Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plane Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            warn!("Mesh upload rejected: {error}");
            return None;
        }

        debug!(
            "Uploaded mesh: {} vertex bytes, {} index bytes",
            vertex_buffer.size(),
            index_buffer.size()
        );

        Some(Self {
            vertex_buffer,
            index_buffer,
            index_count,
        })
    }

    /// Number of indices to draw.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// Renders block meshes.
///
/// Encapsulates the block render pipeline: shader module, pipeline layout and
/// the draw call itself.
pub struct MeshingRenderer {
    /// The WebGPU render pipeline for mesh rendering
    render_pipeline: RenderPipeline,
}

impl MeshingRenderer {
    /// Creates a new `MeshingRenderer` instance.
    ///
    /// Shader compilation and pipeline creation run inside a validation error
    /// scope so a broken shader is reported instead of aborting the device.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `shader_source` - The WGSL shader source code
    /// * `texture_format` - The texture format to use for rendering
    /// * `bind_group_state` - Provides the bind group layouts
    /// * `depth_stencil` - Optional depth stencil state
    ///
    /// # Returns
    /// The renderer, or [`RenderError::Shader`] if the shader or pipeline fails validation
    pub fn new(
        device: &Device,
        shader_source: &str,
        texture_format: TextureFormat,
        bind_group_state: &BindGroupState,
        depth_stencil: Option<wgpu::DepthStencilState>,
    ) -> Result<Self, RenderError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Block Render Pipeline Layout"),
            bind_group_layouts: &[
                bind_group_state.scene_bind_group_layout(),
                bind_group_state.texture_bind_group_layout(),
            ],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Block Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        // Some faces wind clockwise, so back-face culling stays off.
        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Block Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: texture_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::Shader(error.to_string()));
        }

        Ok(Self { render_pipeline })
    }

    /// Draws one mesh.
    ///
    /// # Arguments
    /// * `render_pass` - The render pass to use for rendering
    /// * `bind_group_state` - Scene uniform and texture bind groups
    /// * `mesh_buffers` - The uploaded mesh
    pub fn render(
        &self,
        render_pass: &mut RenderPass<'_>,
        bind_group_state: &BindGroupState,
        mesh_buffers: &MeshBuffers,
    ) {
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, bind_group_state.scene_bind_group(), &[]);
        render_pass.set_bind_group(1, bind_group_state.texture_bind_group(), &[]);
        render_pass.set_vertex_buffer(0, mesh_buffers.vertex_buffer.slice(..));
        render_pass.set_index_buffer(mesh_buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..mesh_buffers.index_count, 0, 0..1);
    }

    /// Gets the render pipeline.
    pub fn render_pipeline(&self) -> &RenderPipeline {
        &self.render_pipeline
    }
}
