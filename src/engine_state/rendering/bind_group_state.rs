//! Manages WebGPU bind groups and their layouts.
//!
//! The block shader uses two bind groups:
//!
//! - Group 0: the [`SceneUniform`] block (matrices, lighting, atlas flag)
//! - Group 1: the colour texture and its sampler, which is either the block
//!   atlas or a 1x1 white placeholder

use cgmath::{Matrix4, SquareMatrix, Vector3};
use wgpu::{util::DeviceExt, BindGroup, BindGroupLayout, Buffer, Device, Queue};

use super::texture::Texture;

/// Label of the scene uniform bind group layout
pub const SCENE_BIND_GROUP_LAYOUT: &str = "Scene Bind Group Layout";
/// Label of the scene uniform bind group
pub const SCENE_BIND_GROUP: &str = "Scene Bind Group";
/// Label of the texture bind group layout
pub const TEXTURE_BIND_GROUP_LAYOUT: &str = "Texture Bind Group Layout";
/// Label of the texture bind group
pub const TEXTURE_BIND_GROUP: &str = "Texture Bind Group";
/// Label of the scene uniform buffer
pub const SCENE_BUFFER_NAME: &str = "Scene Uniform Buffer";

/// Uniform block shared by the vertex and fragment stages.
///
/// # Memory Layout
/// - proj, view, model: 3x mat4x4<f32> (192 bytes)
/// - light_direction: vec4<f32>, w unused (16 bytes)
/// - ambient: vec4<f32>, w unused (16 bytes)
/// - use_atlas: u32 followed by 12 bytes of padding
///
/// Total size: 240 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    /// Projection matrix in wgpu clip space
    pub proj: [[f32; 4]; 4],
    /// View matrix
    pub view: [[f32; 4]; 4],
    /// Model matrix
    pub model: [[f32; 4]; 4],
    /// Direction towards the light
    pub light_direction: [f32; 4],
    /// Ambient light colour
    pub ambient: [f32; 4],
    /// 1 when the atlas is bound, 0 for flat colours
    pub use_atlas: u32,
    _padding: [u32; 3],
}

impl SceneUniform {
    /// Creates a uniform block with an identity model matrix.
    ///
    /// # Arguments
    /// * `proj` - Projection matrix
    /// * `view` - View matrix
    /// * `light_direction` - Direction towards the light, not necessarily normalized
    /// * `ambient` - Ambient light colour
    /// * `use_atlas` - Whether fragments sample the atlas
    pub fn new(
        proj: Matrix4<f32>,
        view: Matrix4<f32>,
        light_direction: Vector3<f32>,
        ambient: Vector3<f32>,
        use_atlas: bool,
    ) -> Self {
        Self {
            proj: proj.into(),
            view: view.into(),
            model: Matrix4::<f32>::identity().into(),
            light_direction: light_direction.extend(0.0).into(),
            ambient: ambient.extend(0.0).into(),
            use_atlas: use_atlas as u32,
            _padding: [0; 3],
        }
    }
}

impl Default for SceneUniform {
    fn default() -> Self {
        Self::new(
            Matrix4::identity(),
            Matrix4::identity(),
            Vector3::unit_y(),
            Vector3::new(1.0, 1.0, 1.0),
            false,
        )
    }
}

/// Owns the bind groups of the block pipeline and the resources behind them.
pub struct BindGroupState {
    scene_buffer: Buffer,
    scene_bind_group_layout: BindGroupLayout,
    scene_bind_group: BindGroup,
    texture_bind_group_layout: BindGroupLayout,
    texture_bind_group: BindGroup,
    /// Bound when no atlas is loaded
    placeholder_texture: Texture,
}

impl BindGroupState {
    /// Creates the scene uniform buffer, both layouts and bind groups with the
    /// placeholder texture bound.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue for resource uploads
    pub fn new(device: &Device, queue: &Queue) -> Self {
        let (scene_buffer, scene_bind_group, scene_bind_group_layout) =
            Self::generate_scene_bindgroups(device);

        let texture_bind_group_layout = Self::generate_texture_bind_group_layout(device);
        let placeholder_texture =
            Texture::create_placeholder_texture(device, queue, "Placeholder Texture");
        let texture_bind_group =
            Self::generate_texture_bind_group(device, &texture_bind_group_layout, &placeholder_texture);

        Self {
            scene_buffer,
            scene_bind_group_layout,
            scene_bind_group,
            texture_bind_group_layout,
            texture_bind_group,
            placeholder_texture,
        }
    }

    /// Layout of group 0.
    pub fn scene_bind_group_layout(&self) -> &BindGroupLayout {
        &self.scene_bind_group_layout
    }

    /// Group 0.
    pub fn scene_bind_group(&self) -> &BindGroup {
        &self.scene_bind_group
    }

    /// Layout of group 1.
    pub fn texture_bind_group_layout(&self) -> &BindGroupLayout {
        &self.texture_bind_group_layout
    }

    /// Group 1.
    pub fn texture_bind_group(&self) -> &BindGroup {
        &self.texture_bind_group
    }

    /// Uploads a new uniform block.
    pub fn write_scene_uniform(&self, queue: &Queue, uniform: &SceneUniform) {
        queue.write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(uniform));
    }

    /// Rebinds group 1 to `texture`, or to the placeholder when `None`.
    ///
    /// Must be called whenever the atlas texture is replaced or released so the
    /// bind group never refers to a dropped texture.
    pub fn bind_texture(&mut self, device: &Device, texture: Option<&Texture>) {
        let texture = texture.unwrap_or(&self.placeholder_texture);
        self.texture_bind_group =
            Self::generate_texture_bind_group(device, &self.texture_bind_group_layout, texture);
    }

    /// Creates the scene uniform buffer and its bind group.
    ///
    /// # Returns
    /// A tuple containing the buffer, the bind group and its layout
    fn generate_scene_bindgroups(device: &Device) -> (Buffer, BindGroup, BindGroupLayout) {
        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(SCENE_BUFFER_NAME),
            contents: bytemuck::bytes_of(&SceneUniform::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some(SCENE_BIND_GROUP_LAYOUT),
            });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
            label: Some(SCENE_BIND_GROUP),
        });

        (scene_buffer, scene_bind_group, scene_bind_group_layout)
    }

    fn generate_texture_bind_group_layout(device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some(TEXTURE_BIND_GROUP_LAYOUT),
        })
    }

    fn generate_texture_bind_group(
        device: &Device,
        layout: &BindGroupLayout,
        texture: &Texture,
    ) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
            label: Some(TEXTURE_BIND_GROUP),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<SceneUniform>(), 240);
        assert_eq!(std::mem::size_of::<SceneUniform>() % 16, 0);
    }

    #[test]
    fn uniform_uses_identity_model_and_flag() {
        let uniform = SceneUniform::new(
            Matrix4::identity(),
            Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0)),
            Vector3::new(0.3, 1.0, 0.5),
            Vector3::new(0.3, 0.3, 0.3),
            true,
        );
        let identity: [[f32; 4]; 4] = Matrix4::<f32>::identity().into();
        assert_eq!(uniform.model, identity);
        assert_eq!(uniform.view[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniform.light_direction, [0.3, 1.0, 0.5, 0.0]);
        assert_eq!(uniform.use_atlas, 1);
    }
}
