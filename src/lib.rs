#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Plane
//!
//! A textured voxel plane rendered with Rust and WGPU.
//!
//! The crate fills a square grid with blocks defined in a JSON file, builds one
//! mesh of textured quads for it, and draws it with a single directional light
//! while a free camera flies over the plane.
//!
//! ## Key Modules
//!
//! * `application_state` - Manages the application lifecycle and window management
//! * `config` - Runtime settings read from a JSON file
//! * `engine_state` - The block registry, grid, mesher, texture atlas and renderer
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     voxel_plane::run();
//! }
//! ```
//!
//! The first command line argument names the config file, `config.json` by default.

use application_state::{
    graphics_resources_builder::{GraphicsBuilder, MaybeGraphics},
    ApplicationState,
};
use log::{error, info};
use winit::event_loop::EventLoop;

use config::EngineConfig;

mod application_state;
pub mod config;
pub mod engine_state;

/// Starts the application and blocks until the window closes.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = EngineConfig::load_or_default(EngineConfig::path_from_args(std::env::args()));

    let event_loop = match EventLoop::with_user_event().build() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            error!("Failed to create event loop: {err}");
            return;
        }
    };

    let mut state = ApplicationState {
        graphics: MaybeGraphics::Builder(GraphicsBuilder::new(event_loop.create_proxy(), config)),
        state: None,
    };

    if let Err(err) = event_loop.run_app(&mut state) {
        error!("Event loop stopped with an error: {err}");
    }
}
