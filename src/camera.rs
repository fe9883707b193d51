use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat4, Vec3};

use crate::input::{InputSource, MoveKey};

pub const MOVEMENT_SPEED: f32 = 3.0;
pub const MOUSE_SENSITIVITY: f32 = 0.005;
pub const FOV_Y_DEGREES: f32 = 45.0;
/// Projection aspect is fixed rather than derived from the window size;
/// `InputSource::window_size` stays exposed for a future fix.
pub const ASPECT_RATIO: f32 = 4.0 / 3.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

const INITIAL_POSITION: Vec3 = Vec3::new(0.0, 0.0, 5.0);
const INITIAL_YAW: f32 = PI;
const INITIAL_PITCH: f32 = 0.0;

/// Forward direction from spherical look angles
pub fn direction_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    Vec3::new(
        pitch.cos() * yaw.sin(),
        pitch.sin(),
        pitch.cos() * yaw.cos(),
    )
}

/// Right vector from yaw alone; always horizontal regardless of pitch
pub fn right_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new((yaw - FRAC_PI_2).sin(), 0.0, (yaw - FRAC_PI_2).cos())
}

/// First-person free-look camera.
///
/// Owns the camera pose and integrates it from the input source once per
/// frame: mouse motion accumulates into yaw/pitch (unclamped, so rotating
/// past vertical is allowed), held directional keys translate the position
/// along the derived basis vectors, and the view/projection matrices are
/// recomputed as a consistent snapshot for the render pass.
pub struct CameraController<S: InputSource> {
    input: S,
    position: Vec3,
    /// Yaw in radians, accumulates without wraparound
    horizontal_angle: f32,
    /// Pitch in radians, deliberately unclamped
    vertical_angle: f32,
    fov_y: f32,
    movement_speed: f32,
    mouse_sensitivity: f32,
    last_sample_time: f64,
    last_cursor: (f32, f32),
    view: Mat4,
    projection: Mat4,
}

impl<S: InputSource> CameraController<S> {
    /// Create a controller at the default pose: position (0,0,5), looking
    /// down -Z (yaw = pi), level pitch.
    ///
    /// The previous-sample time and cursor position are seeded from the
    /// source here so the first `update` sees a well-defined (near-zero)
    /// delta instead of hidden first-call state.
    pub fn new(input: S) -> Self {
        let last_sample_time = input.time();
        let last_cursor = input.cursor_position();

        let mut camera = Self {
            input,
            position: INITIAL_POSITION,
            horizontal_angle: INITIAL_YAW,
            vertical_angle: INITIAL_PITCH,
            fov_y: FOV_Y_DEGREES.to_radians(),
            movement_speed: MOVEMENT_SPEED,
            mouse_sensitivity: MOUSE_SENSITIVITY,
            last_sample_time,
            last_cursor,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.recompute_matrices();
        camera
    }

    /// Integrate one frame of input into the pose and matrices.
    ///
    /// Called once per render-loop iteration. A zero elapsed time produces
    /// no movement; a negative one (clock regression) is an accepted input
    /// assumption and integrates backward proportionally.
    pub fn update(&mut self) {
        let now = self.input.time();
        let delta_time = (now - self.last_sample_time) as f32;

        // Look angles accumulate the cursor delta, old minus new: moving
        // the cursor right or down decreases the stored coordinate, so
        // flipping this convention would invert the look direction.
        let (x, y) = self.input.cursor_position();
        self.horizontal_angle += self.mouse_sensitivity * (self.last_cursor.0 - x);
        self.vertical_angle += self.mouse_sensitivity * (self.last_cursor.1 - y);
        self.last_cursor = (x, y);

        let direction = self.direction();
        let right = self.right();

        // Held keys compose additively; diagonals are not normalized.
        if self.input.is_down(MoveKey::Forward) {
            self.position += direction * delta_time * self.movement_speed;
        }
        if self.input.is_down(MoveKey::Backward) {
            self.position -= direction * delta_time * self.movement_speed;
        }
        if self.input.is_down(MoveKey::StrafeRight) {
            self.position += right * delta_time * self.movement_speed;
        }
        if self.input.is_down(MoveKey::StrafeLeft) {
            self.position -= right * delta_time * self.movement_speed;
        }

        self.recompute_matrices();
        self.last_sample_time = now;
    }

    fn recompute_matrices(&mut self) {
        let direction = self.direction();
        let up = self.up();

        self.projection = Mat4::perspective_rh(self.fov_y, ASPECT_RATIO, NEAR_PLANE, FAR_PLANE);
        self.view = Mat4::look_at_rh(self.position, self.position + direction, up);
    }

    /// View matrix snapshot from the last `update`
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// Projection matrix snapshot from the last `update`
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.horizontal_angle
    }

    pub fn pitch(&self) -> f32 {
        self.vertical_angle
    }

    /// Unit forward direction for the current look angles
    pub fn direction(&self) -> Vec3 {
        direction_from_angles(self.horizontal_angle, self.vertical_angle)
    }

    /// Horizontal right vector for the current yaw
    pub fn right(&self) -> Vec3 {
        right_from_yaw(self.horizontal_angle)
    }

    /// Up vector, perpendicular to the other two
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.direction())
    }

    pub fn input(&self) -> &S {
        &self.input
    }

    /// Mutable access to the input source, used by the event loop to feed
    /// window events into the adapter between updates
    pub fn input_mut(&mut self) -> &mut S {
        &mut self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_direction_points_down_negative_z() {
        let direction = direction_from_angles(INITIAL_YAW, INITIAL_PITCH);
        assert!(direction.x.abs() < 1e-6);
        assert!(direction.y.abs() < 1e-6);
        assert!((direction.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn direction_is_unit_length() {
        for &(yaw, pitch) in &[(0.0, 0.0), (PI, 0.3), (-1.2, 2.0), (7.5, -0.9)] {
            let len = direction_from_angles(yaw, pitch).length();
            assert!(
                (len - 1.0).abs() < 1e-5,
                "|direction| = {} at ({}, {})",
                len,
                yaw,
                pitch
            );
        }
    }

    #[test]
    fn right_is_perpendicular_to_direction_for_any_pitch() {
        let right = right_from_yaw(1.3);
        for &pitch in &[0.0, 0.5, -1.0, 2.5] {
            let direction = direction_from_angles(1.3, pitch);
            assert!(right.dot(direction).abs() < 1e-5);
        }
    }
}
