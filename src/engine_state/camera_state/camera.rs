//! # Camera Implementation
//!
//! This module contains the core camera implementation including:
//! - Camera pose (position plus yaw and pitch in degrees)
//! - Projection matrix handling
//! - Camera controller for input processing
//!
//! ## Key Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `Projection`: Manages perspective projection settings
//! - `CameraController`: Collects user input for camera movement
//!
//! ## Orientation
//! Yaw 0 and pitch 0 look along +Z. Yaw turns towards +X and pitch towards +Y:
//!
//! ```text
//! forward = (sin(yaw) * cos(pitch), sin(pitch), cos(yaw) * cos(pitch))
//! ```

use cgmath::*;
use web_time::Duration;

use crate::engine_state::PlayerAction;

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// This matrix performs two main transformations:
/// 1. Scales the Z coordinate from [-1, 1] to [-0.5, 0.5]
/// 2. Translates the Z coordinate from [-0.5, 0.5] to [0, 1]
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Pitch limit in degrees, keeps the view vector away from the up axis
pub const MAX_PITCH_DEGREES: f32 = 89.0;

/// Vertical field of view in degrees
pub const FIELD_OF_VIEW_DEGREES: f32 = 60.0;
/// Near clipping plane distance
pub const Z_NEAR: f32 = 0.1;
/// Far clipping plane distance
pub const Z_FAR: f32 = 200.0;

/// Represents a first-person camera in 3D space.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation around the Y axis
    yaw: Deg<f32>,
    /// Vertical rotation, always within [-89, 89] degrees
    pitch: Deg<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// # Arguments
    /// * `position` - Initial position of the camera in world space
    /// * `yaw` - Initial yaw
    /// * `pitch` - Initial pitch, clamped to the pitch limit
    ///
    /// # Example
    /// ```ignore
    /// use cgmath::{Point3, Deg};
    /// let camera = Camera::new(Point3::new(0.0, 2.0, 5.0), Deg(0.0), Deg(0.0));
    /// ```
    pub fn new<V: Into<Point3<f32>>>(position: V, yaw: Deg<f32>, pitch: Deg<f32>) -> Self {
        let mut camera = Self {
            position: position.into(),
            yaw,
            pitch: Deg(0.0),
        };
        camera.set_orientation(yaw, pitch);
        camera
    }

    /// Current yaw.
    pub fn yaw(&self) -> Deg<f32> {
        self.yaw
    }

    /// Current pitch.
    pub fn pitch(&self) -> Deg<f32> {
        self.pitch
    }

    /// Sets yaw and pitch, clamping pitch to the pitch limit.
    pub fn set_orientation(&mut self, yaw: Deg<f32>, pitch: Deg<f32>) {
        self.yaw = yaw;
        self.pitch = Deg(pitch.0.clamp(-MAX_PITCH_DEGREES, MAX_PITCH_DEGREES));
    }

    /// Gets the camera's forward direction vector.
    ///
    /// # Returns
    /// A unit vector pointing where the camera looks
    pub fn forward(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = Rad::from(self.yaw).sin_cos();
        let (pitch_sin, pitch_cos) = Rad::from(self.pitch).sin_cos();
        Vector3::new(yaw_sin * pitch_cos, pitch_sin, yaw_cos * pitch_cos)
    }

    /// Forward direction projected onto the ground plane.
    pub fn flat_forward(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = Rad::from(self.yaw).sin_cos();
        Vector3::new(yaw_sin, 0.0, yaw_cos)
    }

    /// Strafe direction on the ground plane. Points to the camera's left, so
    /// moving left adds it and moving right subtracts it.
    pub fn strafe_left(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = Rad::from(self.yaw).sin_cos();
        Vector3::new(yaw_cos, 0.0, -yaw_sin)
    }

    /// Calculates the view matrix for this camera.
    ///
    /// # Returns
    /// A 4x4 matrix transforming world coordinates to view space
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.forward(), Vector3::unit_y())
    }

    /// Applies and clears the input collected by `controller`.
    ///
    /// Rotation is applied first, so movement follows the updated yaw.
    /// Horizontal movement is normalized, so walking diagonally is not faster.
    ///
    /// # Arguments
    /// * `controller` - The camera controller containing input state
    /// * `dt` - Time elapsed since the last update
    pub fn apply_controller(&mut self, controller: &mut CameraController, dt: Duration) {
        let dt = dt.as_secs_f32();

        self.set_orientation(
            self.yaw - Deg(controller.rotate_horizontal * controller.sensitivity),
            self.pitch - Deg(controller.rotate_vertical * controller.sensitivity),
        );

        let forward_amount = controller.amount_forward - controller.amount_backward;
        let left_amount = controller.amount_left - controller.amount_right;
        let horizontal = self.flat_forward() * forward_amount + self.strafe_left() * left_amount;
        let velocity = controller.speed * dt;

        if horizontal.magnitude2() > 0.0 {
            self.position += horizontal.normalize() * velocity;
        }
        self.position.y += (controller.amount_up - controller.amount_down) * velocity;

        controller.reset();
    }
}

/// Represents a camera's projection matrix and related parameters.
#[derive(Debug)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view (can be any type convertible to `Rad<f32>`)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: aspect_ratio(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Creates the default block view projection for a viewport.
    pub fn for_viewport(width: u32, height: u32) -> Self {
        Self::new(width, height, Deg(FIELD_OF_VIEW_DEGREES), Z_NEAR, Z_FAR)
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    /// Current aspect ratio.
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Calculates the projection matrix.
    ///
    /// Combines the perspective projection with the OpenGL to WGPU coordinate system transform.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// Collects movement and mouse-look input between camera updates.
#[derive(Debug)]
pub struct CameraController {
    // Movement amounts, 1.0 while the key is down
    amount_left: f32,
    amount_right: f32,
    amount_forward: f32,
    amount_backward: f32,
    amount_up: f32,
    amount_down: f32,

    // Accumulated mouse motion in pixels
    rotate_horizontal: f32,
    rotate_vertical: f32,

    // Configuration
    speed: f32,
    sensitivity: f32,
}

impl CameraController {
    /// Creates a new camera controller with the given speed and sensitivity.
    ///
    /// # Arguments
    /// * `speed` - Movement speed in units per second
    /// * `sensitivity` - Degrees of rotation per pixel of mouse motion
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            amount_left: 0.0,
            amount_right: 0.0,
            amount_forward: 0.0,
            amount_backward: 0.0,
            amount_up: 0.0,
            amount_down: 0.0,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            speed,
            sensitivity,
        }
    }

    /// Processes player actions and updates controller state accordingly.
    ///
    /// # Arguments
    /// * `actions` - The player's input actions to process
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        let amount = |active: bool| if active { 1.0 } else { 0.0 };
        self.amount_forward = amount(actions.move_forward);
        self.amount_backward = amount(actions.move_backward);
        self.amount_left = amount(actions.move_left);
        self.amount_right = amount(actions.move_right);
        self.amount_up = amount(actions.move_up);
        self.amount_down = amount(actions.move_down);

        if let Some((delta_x, delta_y)) = actions.rotate_view {
            self.rotate_horizontal += delta_x as f32;
            self.rotate_vertical += delta_y as f32;
        }
    }

    /// Checks if there are any pending updates that would affect the camera.
    pub fn has_updates(&self) -> bool {
        self.amount_forward > 0.0
            || self.amount_backward > 0.0
            || self.amount_left > 0.0
            || self.amount_right > 0.0
            || self.amount_up > 0.0
            || self.amount_down > 0.0
            || self.rotate_horizontal != 0.0
            || self.rotate_vertical != 0.0
    }

    fn reset(&mut self) {
        *self = Self::new(self.speed, self.sensitivity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_vec_close(actual: Vector3<f32>, expected: Vector3<f32>) {
        assert!(
            (actual - expected).magnitude() < EPSILON,
            "{actual:?} != {expected:?}"
        );
    }

    fn walk(actions: PlayerAction, seconds: f32) -> Camera {
        let mut camera = Camera::new(Point3::new(0.0, 2.0, 5.0), Deg(0.0), Deg(0.0));
        let mut controller = CameraController::new(5.0, 0.12);
        controller.intake_actions(&actions);
        camera.apply_controller(&mut controller, Duration::from_secs_f32(seconds));
        camera
    }

    #[test]
    fn forward_follows_yaw_and_pitch() {
        let camera = Camera::new(Point3::origin(), Deg(0.0), Deg(0.0));
        assert_vec_close(camera.forward(), Vector3::unit_z());

        let camera = Camera::new(Point3::origin(), Deg(90.0), Deg(0.0));
        assert_vec_close(camera.forward(), Vector3::unit_x());

        let camera = Camera::new(Point3::origin(), Deg(0.0), Deg(30.0));
        assert_vec_close(camera.forward(), Vector3::new(0.0, 0.5, 0.75f32.sqrt()));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new(Point3::origin(), Deg(0.0), Deg(120.0));
        assert_eq!(camera.pitch(), Deg(89.0));
        camera.set_orientation(Deg(10.0), Deg(-95.0));
        assert_eq!(camera.pitch(), Deg(-89.0));
        assert_eq!(camera.yaw(), Deg(10.0));
    }

    #[test]
    fn view_matrix_puts_target_in_front() {
        let camera = Camera::new(Point3::new(0.0, 2.0, 5.0), Deg(0.0), Deg(0.0));
        let view = camera.calc_matrix();

        let eye = view.transform_point(camera.position);
        assert_vec_close(eye.to_vec(), Vector3::zero());

        // Right-handed view space looks down -Z.
        let ahead = view.transform_point(camera.position + camera.forward() * 3.0);
        assert_vec_close(ahead.to_vec(), Vector3::new(0.0, 0.0, -3.0));
    }

    #[test]
    fn walking_forward_moves_along_flat_forward() {
        let actions = PlayerAction {
            move_forward: true,
            ..Default::default()
        };
        let camera = walk(actions, 1.0);
        assert_vec_close(camera.position.to_vec(), Vector3::new(0.0, 2.0, 10.0));
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let actions = PlayerAction {
            move_forward: true,
            move_left: true,
            ..Default::default()
        };
        let camera = walk(actions, 1.0);
        let moved = camera.position - Point3::new(0.0, 2.0, 5.0);
        assert!((moved.magnitude() - 5.0).abs() < EPSILON);
        // Left of a camera looking along +Z is +X.
        assert!(moved.x > 0.0 && moved.z > 0.0);
    }

    #[test]
    fn opposite_keys_cancel() {
        let actions = PlayerAction {
            move_forward: true,
            move_backward: true,
            move_up: true,
            ..Default::default()
        };
        let camera = walk(actions, 0.5);
        assert_vec_close(camera.position.to_vec(), Vector3::new(0.0, 4.5, 5.0));
    }

    #[test]
    fn mouse_motion_turns_camera() {
        let mut camera = Camera::new(Point3::origin(), Deg(0.0), Deg(0.0));
        let mut controller = CameraController::new(5.0, 0.5);
        controller.intake_actions(&PlayerAction {
            rotate_view: Some((10.0, -4.0)),
            ..Default::default()
        });
        assert!(controller.has_updates());

        camera.apply_controller(&mut controller, Duration::from_millis(16));
        assert_eq!(camera.yaw(), Deg(-5.0));
        assert_eq!(camera.pitch(), Deg(2.0));
        assert!(!controller.has_updates());
    }

    #[test]
    fn projection_maps_depth_range_to_wgpu() {
        let projection = Projection::for_viewport(1280, 720);
        let matrix = projection.calc_matrix();

        let near = matrix * Vector4::new(0.0, 0.0, -Z_NEAR, 1.0);
        let far = matrix * Vector4::new(0.0, 0.0, -Z_FAR, 1.0);
        assert!((near.z / near.w).abs() < EPSILON);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn projection_survives_zero_height() {
        let mut projection = Projection::for_viewport(800, 600);
        projection.resize(800, 0);
        assert!(projection.aspect().is_finite());
    }
}
