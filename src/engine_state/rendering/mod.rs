//! Rendering system for the voxel plane.
//!
//! This module contains the core rendering functionality: the texture atlas,
//! mesh generation, pipeline setup and the per-frame draw. It provides a
//! high-level interface for drawing the block mesh using WebGPU.

use std::path::Path;

use cgmath::{Matrix4, Vector3};
use log::{debug, warn};
use thiserror::Error;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};

use atlas::{AtlasError, TextureAtlas, TileUvSource};
use bind_group_state::SceneUniform;
use meshing::{Mesh, MeshBuffers};
use pipeline_manager::PipelineManager;

pub mod atlas;
mod bind_group_state;
pub mod meshing;
mod pipeline_manager;
mod texture;
mod vertex;

// Re-export commonly used types
pub use vertex::Vertex;

/// Errors produced by the render pipeline.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The shader file could not be read.
    #[error("failed to read shader {path}: {source}")]
    ShaderSource {
        /// Shader file path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The shader or pipeline failed validation.
    #[error("block shader failed validation: {0}")]
    Shader(String),
    /// The surface cannot provide frames any more.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Reads a WGSL shader file.
pub fn load_shader_source(path: impl AsRef<Path>) -> Result<String, RenderError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| RenderError::ShaderSource {
        path: path.display().to_string(),
        source,
    })
}

/// Lighting and background settings of the block shader.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Lighting {
    /// Direction towards the light
    pub light_direction: Vector3<f32>,
    /// Ambient light colour
    pub ambient: Vector3<f32>,
    /// Background colour
    pub clear_color: [f32; 3],
}

/// Manages the entire rendering pipeline for the voxel plane.
///
/// This struct is the main entry point for all rendering operations.
/// It owns the WebGPU surface, device and queue, the block atlas and the
/// buffers of the current mesh.
pub struct MeshRendererManager {
    /// The WebGPU surface being rendered to
    pub surface: Surface<'static>,
    /// Configuration for the surface (size, format, etc.)
    pub surface_config: SurfaceConfiguration,
    /// The WebGPU device used for creating GPU resources
    pub device: Device,
    /// The WebGPU queue for submitting command buffers
    pub queue: Queue,
    /// Manages the rendering pipeline and shaders
    pub pipeline_manager: PipelineManager,
    /// The block texture atlas
    atlas: TextureAtlas,
    /// GPU buffers of the current mesh
    mesh_buffers: Option<MeshBuffers>,
    lighting: Lighting,
}

impl MeshRendererManager {
    /// Creates a new `MeshRendererManager` instance.
    ///
    /// The atlas starts unloaded, so blocks draw with flat colours until
    /// [`load_atlas`](Self::load_atlas) succeeds.
    ///
    /// # Arguments
    /// * `surface` - The WebGPU surface to render to
    /// * `surface_config` - Configuration for the surface
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue
    /// * `shader_source` - WGSL source code of the block shader
    /// * `lighting` - Light, ambient and background colours
    ///
    /// # Returns
    /// The manager, or a [`RenderError`] if the shader fails validation
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        shader_source: &str,
        lighting: Lighting,
    ) -> Result<Self, RenderError> {
        let pipeline_manager = PipelineManager::new(
            &device,
            &queue,
            &surface_config,
            surface_config.format,
            shader_source,
            lighting.clear_color,
        )?;

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline_manager,
            atlas: TextureAtlas::new(),
            mesh_buffers: None,
            lighting,
        })
    }

    /// The block texture atlas.
    pub fn atlas(&self) -> &TextureAtlas {
        &self.atlas
    }

    /// Loads a new atlas image and binds it.
    ///
    /// The previous atlas is released first. On failure the placeholder
    /// texture is bound and blocks draw with flat colours. Meshes built
    /// against the old atlas must be rebuilt either way.
    pub fn load_atlas(
        &mut self,
        path: impl AsRef<Path>,
        tile_width: i32,
        tile_height: i32,
        flip_vertically: bool,
    ) -> Result<(), AtlasError> {
        let result = self.atlas.load_from_file(
            &self.device,
            &self.queue,
            path,
            tile_width,
            tile_height,
            flip_vertically,
        );
        self.pipeline_manager
            .bind_group_state
            .bind_texture(&self.device, self.atlas.texture());
        result
    }

    /// Replaces the GPU copy of the mesh.
    ///
    /// The new buffers are created before the old ones are dropped. `None` or
    /// an empty mesh leaves nothing to draw.
    pub fn upload_mesh(&mut self, mesh: Option<&Mesh>) {
        let mesh_buffers = mesh.and_then(|mesh| MeshBuffers::upload(&self.device, mesh));
        debug!(
            "Mesh buffers replaced, {} indices",
            mesh_buffers.as_ref().map_or(0, MeshBuffers::index_count)
        );
        self.mesh_buffers = mesh_buffers;
    }

    /// Whether a mesh is uploaded.
    pub fn has_mesh(&self) -> bool {
        self.mesh_buffers.is_some()
    }

    /// Handles window resize events.
    ///
    /// Updates the surface configuration and the depth texture. Zero sized
    /// windows are ignored until they become visible again.
    ///
    /// # Arguments
    /// * `size` - The new window size in physical pixels
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;

        self.surface.configure(&self.device, &self.surface_config);
        self.pipeline_manager
            .resize(&self.device, &self.surface_config);
    }

    /// Renders a new frame.
    ///
    /// Uploads the uniform block (identity model matrix) and draws the current
    /// mesh with the atlas bound. A lost or outdated surface is reconfigured and
    /// the frame skipped.
    ///
    /// # Arguments
    /// * `proj` - Projection matrix
    /// * `view` - View matrix
    ///
    /// # Errors
    /// [`RenderError::Surface`] when the surface is out of memory
    pub fn render(&mut self, proj: Matrix4<f32>, view: Matrix4<f32>) -> Result<(), RenderError> {
        let uniform = SceneUniform::new(
            proj,
            view,
            self.lighting.light_direction,
            self.lighting.ambient,
            self.atlas.is_valid(),
        );
        self.pipeline_manager
            .bind_group_state
            .write_scene_uniform(&self.queue, &uniform);

        match self.pipeline_manager.render(
            &self.surface,
            &self.device,
            &self.queue,
            self.mesh_buffers.as_ref(),
        ) {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(wgpu::SurfaceError::OutOfMemory.into()),
            Err(err) => {
                warn!("Skipping frame: {err}");
                Ok(())
            }
        }
    }
}
