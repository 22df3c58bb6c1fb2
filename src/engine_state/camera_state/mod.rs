//! # Camera State Management
//!
//! This module handles all camera-related functionality including:
//! - Camera position and orientation tracking
//! - View and projection matrix calculations
//! - Player input processing for camera control
//!
//! ## Core Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `CameraController`: Collects player input between updates
//! - `Projection`: Manages the camera's projection matrix
//!
//! ## Key Features
//! - First-person camera controls (WASD, Space/Shift, mouse look)
//! - Perspective projection converted to wgpu clip space

use camera::{Camera, CameraController, Projection};
use cgmath::{Deg, Matrix4, Point3};

use super::PlayerAction;

pub mod camera;

/// Manages the camera pose, its controller and the projection.
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// Handles player input and camera movement
    pub camera_controller: CameraController,
    /// Perspective projection matching the surface size
    pub projection: Projection,
}

impl CameraState {
    /// Creates a new `CameraState` looking along +Z.
    ///
    /// # Arguments
    /// * `position` - Initial camera position
    /// * `walk_speed` - Movement speed in units per second
    /// * `mouse_sensitivity` - Degrees of rotation per pixel of mouse motion
    /// * `width`, `height` - Surface size in pixels
    pub fn new(
        position: Point3<f32>,
        walk_speed: f32,
        mouse_sensitivity: f32,
        width: u32,
        height: u32,
    ) -> Self {
        CameraState {
            camera: Camera::new(position, Deg(0.0), Deg(0.0)),
            camera_controller: CameraController::new(walk_speed, mouse_sensitivity),
            projection: Projection::for_viewport(width, height),
        }
    }

    /// Processes player input actions and updates the camera controller state.
    ///
    /// # Arguments
    /// * `actions` - The player's input actions to process
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.camera_controller.intake_actions(actions);
    }

    /// Applies pending input to the camera.
    ///
    /// # Arguments
    /// * `dt` - Time elapsed since the last update
    ///
    /// # Returns
    /// `true` if the camera moved or turned
    pub fn update(&mut self, dt: web_time::Duration) -> bool {
        if !self.camera_controller.has_updates() {
            return false;
        }
        self.camera
            .apply_controller(&mut self.camera_controller, dt);
        true
    }

    /// Updates the projection for a new surface size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// Current view matrix.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.camera.calc_matrix()
    }

    /// Current projection matrix.
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection.calc_matrix()
    }
}
