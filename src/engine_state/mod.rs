//! # Engine State Module
//!
//! The core engine module that manages the state and functionality of the voxel plane.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `camera_state` - Handles camera positioning and movement
//! * `rendering` - Texture atlas, meshing and the render pipeline
//! * `scene` - The block registry, the grid and the last built mesh
//! * `voxels` - Block records and the block grid
//!
//! ## Architecture
//!
//! `EngineState` is the central coordinator. Each frame it turns input into
//! camera movement and draws the uploaded mesh. The mesh is only rebuilt when
//! asked to, by [`EngineState::rebuild_mesh`] or the asset reload action.

use cgmath::{Point3, Vector3};
use log::{error, info, warn};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::keyboard::KeyCode;

use camera_state::CameraState;
use rendering::{
    atlas::TileUvSource, meshing::PlaneMesher, Lighting, MeshRendererManager, RenderError,
};
use scene::Scene;

use crate::{application_state::input_state::ProcessedInputState, config::EngineConfig};

pub mod camera_state;
pub mod rendering;
pub mod scene;
pub mod voxels;

/// The main state container for the voxel plane.
///
/// # Examples
///
/// ```ignore
/// let mut engine_state = EngineState::new(surface, surface_config, device, queue, &shader, config)?;
///
/// // Main loop
/// loop {
///     engine_state.process_input(delta_time);
///     engine_state.render()?;
/// }
/// ```
pub struct EngineState {
    /// Camera state managing position, orientation and movement
    pub camera_state: CameraState,
    /// Current player actions derived from input
    pub player_actions: PlayerAction,
    /// Manager for rendering operations
    pub render_manager: MeshRendererManager,
    /// Blocks, grid and the last built mesh
    pub scene: Scene,
    /// Builds meshes from the scene
    mesher: PlaneMesher,
    /// Settings the engine was started with
    config: EngineConfig,
}

impl EngineState {
    /// Creates a new engine state with all subsystems initialized.
    ///
    /// Loads the atlas and the block definitions named in `config`, fills the
    /// grid with the default block and uploads the first mesh. Missing assets
    /// are logged and replaced by fallbacks; only a broken shader is fatal.
    ///
    /// # Arguments
    ///
    /// * `surface` - The rendering surface
    /// * `surface_config` - Configuration for the rendering surface
    /// * `device` - The GPU device
    /// * `queue` - The GPU command queue
    /// * `shader_source` - WGSL source of the block shader
    /// * `config` - Runtime settings
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        shader_source: &str,
        config: EngineConfig,
    ) -> Result<Self, RenderError> {
        let camera_state = CameraState::new(
            Point3::from(config.camera_position),
            config.walk_speed,
            config.mouse_sensitivity,
            surface_config.width,
            surface_config.height,
        );

        let lighting = Lighting {
            light_direction: Vector3::from(config.light_direction),
            ambient: Vector3::from(config.ambient),
            clear_color: config.clear_color,
        };
        let render_manager = MeshRendererManager::new(
            surface,
            surface_config,
            device,
            queue,
            shader_source,
            lighting,
        )?;

        let mesher = PlaneMesher::with_max_indices(config.max_mesh_indices)
            .with_buffer_limit(render_manager.device.limits().max_buffer_size);

        let scene = Scene::load(
            &config.blocks_path,
            &config.default_block,
            config.world_width,
            config.plane_y,
        );

        let mut engine_state = Self {
            camera_state,
            player_actions: PlayerAction::default(),
            render_manager,
            scene,
            mesher,
            config,
        };
        engine_state.load_atlas();
        engine_state.rebuild_mesh();

        Ok(engine_state)
    }

    fn load_atlas(&mut self) {
        let config = &self.config;
        if let Err(err) = self.render_manager.load_atlas(
            &config.atlas_path,
            config.tile_width,
            config.tile_height,
            config.flip_atlas_vertically,
        ) {
            warn!("{err}, drawing blocks with flat colours");
        }
    }

    /// Rebuilds the mesh from the scene and uploads it.
    ///
    /// # Returns
    /// `false` if the build failed, in which case nothing is drawn until the
    /// next successful rebuild
    pub fn rebuild_mesh(&mut self) -> bool {
        let atlas: &dyn TileUvSource = self.render_manager.atlas();
        match self.scene.build_mesh(&self.mesher, Some(atlas)) {
            Ok(mesh) => {
                info!(
                    "Mesh rebuilt: {} quads, {} indices",
                    mesh.quad_count(),
                    mesh.index_count()
                );
                self.render_manager.upload_mesh(Some(mesh));
                true
            }
            Err(err) => {
                error!("Mesh build failed: {err}");
                self.render_manager.upload_mesh(None);
                false
            }
        }
    }

    /// Reloads the atlas image and the block definitions, then rebuilds the mesh.
    pub fn reload_assets(&mut self) {
        info!("Reloading assets");
        self.load_atlas();
        match self.scene.reload_blocks(&self.config.blocks_path) {
            Ok(count) => info!("Reloaded {count} block definitions"),
            Err(err) => warn!("{err}, keeping current block definitions"),
        }
        self.rebuild_mesh();
    }

    /// Resizes the rendering surface when the window size changes
    ///
    /// # Arguments
    ///
    /// * `size` - The new physical size of the window
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.render_manager.resize_surface(size);
        if size.width > 0 && size.height > 0 {
            self.camera_state.resize(size.width, size.height);
        }
    }

    /// Renders the current frame
    pub fn render(&mut self) -> Result<(), RenderError> {
        let proj = self.camera_state.projection_matrix();
        let view = self.camera_state.view_matrix();
        self.render_manager.render(proj, view)
    }

    /// Processes input and updates the camera and world state
    ///
    /// # Arguments
    ///
    /// * `wait_duration` - The time elapsed since the last frame
    pub fn process_input(&mut self, wait_duration: web_time::Duration) {
        self.camera_state.intake_actions(&self.player_actions);
        self.camera_state.update(wait_duration);

        if self.player_actions.reload_assets {
            self.reload_assets();
        }

        self.player_actions = PlayerAction::default();
    }

    /// Sets the input commands for the engine state.
    ///
    /// # Arguments
    /// * `input` - The processed input state to use for setting commands
    pub(crate) fn set_input_commands(&mut self, input: ProcessedInputState) {
        self.player_actions = PlayerAction::from_input(&input);
    }
}

/// Represents player actions derived from input
///
/// This struct contains flags for the actions that can be triggered by input:
/// movement, camera rotation and asset reloading.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlayerAction {
    /// Movement actions - true if key is pressed or held
    move_forward: bool,
    move_backward: bool,
    move_left: bool,
    move_right: bool,
    move_up: bool,
    move_down: bool,

    /// View rotation - Some if the left mouse button is down and the mouse moved
    rotate_view: Option<(f64, f64)>,

    /// Reload atlas and blocks - only on key press, not hold
    reload_assets: bool,
}

impl PlayerAction {
    /// Translates the processed input state into player actions.
    ///
    /// # Arguments
    /// * `input` - The processed input state to translate
    pub(crate) fn from_input(input: &ProcessedInputState) -> Self {
        let mut player_action = PlayerAction {
            move_forward: input.get_key_state(KeyCode::KeyW).is_active(),
            move_backward: input.get_key_state(KeyCode::KeyS).is_active(),
            move_left: input.get_key_state(KeyCode::KeyA).is_active(),
            move_right: input.get_key_state(KeyCode::KeyD).is_active(),
            move_up: input.get_key_state(KeyCode::Space).is_active(),
            move_down: input.get_key_state(KeyCode::ShiftLeft).is_active(),
            reload_assets: input.get_key_state(KeyCode::KeyR).is_just_pressed(),
            ..Default::default()
        };

        if input
            .get_mouse_button_state(winit::event::MouseButton::Left)
            .is_active()
        {
            player_action.rotate_view = input.get_mouse_delta();
        }

        player_action
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use winit::event::MouseButton;

    use super::*;
    use crate::application_state::input_state::RawInputState;

    fn input(
        keys: &[(KeyCode, RawInputState)],
        left_button: RawInputState,
        mouse_delta: Option<(f64, f64)>,
    ) -> ProcessedInputState {
        ProcessedInputState {
            keyboard_states: keys.iter().copied().collect(),
            mouse_button_states: HashMap::from([(MouseButton::Left, left_button)]),
            mouse_delta,
        }
    }

    #[test]
    fn held_keys_map_to_movement() {
        let actions = PlayerAction::from_input(&input(
            &[
                (KeyCode::KeyW, RawInputState::Held),
                (KeyCode::KeyD, RawInputState::Pressed),
                (KeyCode::Space, RawInputState::Released),
            ],
            RawInputState::NotPressed,
            None,
        ));

        assert!(actions.move_forward);
        assert!(actions.move_right);
        assert!(!actions.move_up);
        assert!(!actions.move_backward);
    }

    #[test]
    fn mouse_look_requires_left_button() {
        let released = PlayerAction::from_input(&input(&[], RawInputState::NotPressed, Some((3.0, 1.0))));
        assert_eq!(released.rotate_view, None);

        let held = PlayerAction::from_input(&input(&[], RawInputState::Held, Some((3.0, 1.0))));
        assert_eq!(held.rotate_view, Some((3.0, 1.0)));
    }

    #[test]
    fn reload_triggers_only_on_press() {
        let pressed = PlayerAction::from_input(&input(
            &[(KeyCode::KeyR, RawInputState::Pressed)],
            RawInputState::NotPressed,
            None,
        ));
        assert!(pressed.reload_assets);

        let held = PlayerAction::from_input(&input(
            &[(KeyCode::KeyR, RawInputState::Held)],
            RawInputState::NotPressed,
            None,
        ));
        assert!(!held.reload_assets);
    }
}
