//! Manages the WebGPU render pipeline and associated rendering resources.
//!
//! This module coordinates a frame: it acquires the surface texture, clears
//! colour and depth, delegates the block draw to [`MeshingRenderer`] and
//! presents the result.
//!
//! # Architecture
//!
//! - `PipelineManager`: Owns the shared frame resources and runs the render pass
//! - `MeshingRenderer`: Owns the block pipeline and issues the draw call
//! - `BindGroupState`: Owns the scene uniform and texture bindings

use wgpu::{Device, Queue, Surface, SurfaceConfiguration, TextureFormat};

use super::{
    bind_group_state::BindGroupState,
    meshing::{MeshBuffers, MeshingRenderer},
    texture, RenderError,
};

/// Owns the frame resources and runs the render pass.
pub struct PipelineManager {
    /// Scene uniform and texture bindings
    pub bind_group_state: BindGroupState,
    /// Depth texture used for depth testing
    pub depth_texture: texture::Texture,
    /// Block mesh renderer
    pub meshing_renderer: MeshingRenderer,
    /// Background colour
    clear_color: wgpu::Color,
}

impl PipelineManager {
    /// Creates a new `PipelineManager` instance.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue for resource uploads
    /// * `config` - Surface configuration containing size and format
    /// * `texture_format` - The texture format to use for rendering
    /// * `shader_source` - The WGSL shader source code for block rendering
    /// * `clear_color` - Background colour
    ///
    /// # Returns
    /// The manager, or a [`RenderError`] if the block pipeline cannot be built
    pub fn new(
        device: &Device,
        queue: &Queue,
        config: &SurfaceConfiguration,
        texture_format: TextureFormat,
        shader_source: &str,
        clear_color: [f32; 3],
    ) -> Result<Self, RenderError> {
        let bind_group_state = BindGroupState::new(device, queue);

        let depth_texture = texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE");

        let depth_stencil = Some(wgpu::DepthStencilState {
            format: texture::Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let meshing_renderer = MeshingRenderer::new(
            device,
            shader_source,
            texture_format,
            &bind_group_state,
            depth_stencil,
        )?;

        let [r, g, b] = clear_color;
        Ok(Self {
            bind_group_state,
            depth_texture,
            meshing_renderer,
            clear_color: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            },
        })
    }

    /// Renders a frame to the given surface.
    ///
    /// Clears colour and depth, draws `mesh_buffers` if there is one and
    /// presents the frame.
    ///
    /// # Arguments
    /// * `surface` - The target surface to render to
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue for command submission
    /// * `mesh_buffers` - The uploaded block mesh, `None` to draw only the background
    ///
    /// # Errors
    /// Returns the surface error when no frame could be acquired; nothing is drawn
    pub fn render(
        &self,
        surface: &Surface,
        device: &Device,
        queue: &Queue,
        mesh_buffers: Option<&MeshBuffers>,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = surface.get_current_texture()?;

        let view = frame.texture.create_view(&Default::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Block Render Encoder"),
        });
        {
            let depth_stencil_attachment = Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            });
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Block Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment,
                ..Default::default()
            });

            if let Some(mesh_buffers) = mesh_buffers {
                self.meshing_renderer
                    .render(&mut rpass, &self.bind_group_state, mesh_buffers);
            }
        }

        queue.submit([encoder.finish()]);
        frame.present();
        Ok(())
    }

    /// Handles window resize events by recreating the depth texture.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - The new surface configuration containing the updated size
    pub fn resize(&mut self, device: &Device, config: &SurfaceConfiguration) {
        self.depth_texture = texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE");
    }
}
