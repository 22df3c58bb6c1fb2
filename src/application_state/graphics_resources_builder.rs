//! # Graphics Resources Builder
//!
//! This module handles the creation of the graphics resources required by the application:
//! the window, the WebGPU surface, adapter, device and queue, and the block shader source.
//!
//! The main components are:
//! - `Graphics`: Holds all graphics-related resources
//! - `GraphicsBuilder`: Helper that creates the resources once the event loop is running
//! - `MaybeGraphics`: Represents the various states of graphics initialization

use std::future::Future;
use std::sync::Arc;

use log::{error, info};
use thiserror::Error;
use wgpu::{
    Adapter, Device, Features, Instance, Queue, Surface, SurfaceConfiguration, TextureFormat,
};
use winit::{
    dpi::PhysicalSize,
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::EngineConfig,
    engine_state::rendering::{load_shader_source, RenderError},
};

/// Errors that prevent the graphics context from being created.
#[derive(Error, Debug)]
pub enum GraphicsError {
    /// The window could not be opened.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// The window cannot be rendered to.
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    /// No GPU adapter supports the surface.
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    /// The adapter refused to open a device.
    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    /// The block shader could not be read.
    #[error(transparent)]
    Shader(#[from] RenderError),
}

/// Contains all graphics-related resources required by the application.
///
/// This struct holds handles to WebGPU resources together with the settings the
/// engine will be started with. It is created once the event loop is running and
/// handed over to the engine as a whole.
#[derive(Default)]
pub struct Graphics {
    pub window: Option<Arc<Window>>,
    pub instance: Option<Instance>,
    pub surface: Option<Surface<'static>>,
    pub surface_config: Option<SurfaceConfiguration>,
    pub adapter: Option<Adapter>,
    pub device: Option<Device>,
    pub queue: Option<Queue>,
    pub shader_file_string: String,
    pub config: EngineConfig,
}

/// Creates the window and surface, then returns a future that finishes the
/// graphics setup.
///
/// # Arguments
/// * `event_loop` - The active event loop used to create the window and surface
/// * `config` - Window and shader settings
///
/// # Returns
/// A `Future` that resolves to the initialized `Graphics` when complete
fn create_graphics(
    event_loop: &ActiveEventLoop,
    config: EngineConfig,
) -> Result<impl Future<Output = Result<Graphics, GraphicsError>> + 'static, GraphicsError> {
    let window_attrs = Window::default_attributes()
        .with_title(config.window_title.clone())
        .with_inner_size(PhysicalSize::new(config.window_width, config.window_height));

    let window = Arc::new(event_loop.create_window(window_attrs)?);

    // Backends::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance.create_surface(window.clone())?;

    Ok(async move {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        info!("Using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let size = window.inner_size();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = pick_surface_format(&surface_caps.formats);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let shader_string = load_shader_source(&config.shader_path)?;

        surface.configure(&device, &surface_config);
        Ok::<_, GraphicsError>(Graphics {
            window: Some(window),
            instance: Some(instance),
            surface: Some(surface),
            surface_config: Some(surface_config),
            adapter: Some(adapter),
            device: Some(device),
            queue: Some(queue),
            shader_file_string: shader_string,
            config,
        })
    })
}

/// Picks the surface format, preferring one without sRGB encoding.
///
/// Block colours and lighting are authored in display space, so writing them
/// to an sRGB surface would brighten every pixel.
fn pick_surface_format(formats: &[TextureFormat]) -> TextureFormat {
    formats
        .iter()
        .find(|format| !format.is_srgb())
        .or_else(|| formats.first())
        .copied()
        .unwrap_or(TextureFormat::Bgra8Unorm)
}

/// Helper struct for managing the initialization of graphics resources.
///
/// Window creation has to wait until the event loop is running, so the builder
/// holds on to the settings and the proxy until then.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<Graphics>>,
    config: EngineConfig,
}

/// Represents the possible states of the graphics initialization process.
pub enum MaybeGraphics {
    /// State before the event loop has resumed
    Builder(GraphicsBuilder),

    /// State when graphics resources are fully initialized and ready for use
    Graphics(Graphics),

    /// State after graphics resources have been moved to another owner
    Moved,
}

impl GraphicsBuilder {
    /// Creates a new GraphicsBuilder with the specified event loop proxy.
    ///
    /// # Arguments
    /// * `event_loop_proxy` - Used to send the initialized graphics resources back to the main thread
    /// * `config` - Settings the window and the engine are created with
    pub fn new(event_loop_proxy: EventLoopProxy<Graphics>, config: EngineConfig) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
            config,
        }
    }

    /// Creates the graphics resources and sends them back to the main thread
    /// using the event loop proxy.
    ///
    /// If any resource cannot be created the error is logged and the event loop exits.
    ///
    /// # Arguments
    /// * `event_loop` - The active event loop used to create the graphics context
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop) {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            // event_loop_proxy is already spent - we already constructed Graphics
            return;
        };

        let graphics = create_graphics(event_loop, self.config.clone())
            .and_then(pollster::block_on);

        match graphics {
            Ok(gfx) => {
                if event_loop_proxy.send_event(gfx).is_err() {
                    error!("Event loop closed before graphics were ready");
                    event_loop.exit();
                }
            }
            Err(err) => {
                error!("{err}");
                event_loop.exit();
            }
        }
    }
}
