use glam::{Mat3, Mat4, Vec3};

const MAX_PITCH: f32 = 89.0;
const MIN_ZOOM: f32 = 1.0;
const MAX_ZOOM: f32 = 45.0;

/// Directions the camera can be moved in by the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// A free-flying camera controlled by yaw and pitch angles (in degrees).
///
/// `zoom` is the vertical field of view in degrees and is meant to be fed into a [`crate::Projection`].
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Camera {
    #[must_use]
    pub fn new(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            world_up,
            yaw,
            pitch: pitch.clamp(-MAX_PITCH, MAX_PITCH),
            zoom: MAX_ZOOM,
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: world_up,
        };
        camera.update_vectors();
        camera
    }

    /// The view matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// The view matrix without its translation part, used for geometry "at infinity" like a skybox.
    #[must_use]
    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::from_mat3(Mat3::from_mat4(self.matrix()))
    }

    /// Moves the camera along its local axes; `delta_time` is in seconds.
    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Turns the camera by a mouse delta. Positive `y_offset` looks up.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch = (self.pitch + y_offset * self.mouse_sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
        self.update_vectors();
    }

    /// Narrows (positive `y_offset`) or widens the field of view.
    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    fn update_vectors(&mut self) {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        self.front = Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn yaw_minus_ninety_looks_down_negative_z() {
        let camera = Camera::new(Vec3::ZERO, Vec3::Y, -90.0, 0.0);
        assert!(
            camera.front.abs_diff_eq(Vec3::NEG_Z, EPSILON),
            "front was {}",
            camera.front
        );
        assert!(
            camera.right.abs_diff_eq(Vec3::X, EPSILON),
            "right was {}",
            camera.right
        );
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::Y, -90.0, 0.0);
        camera.process_mouse_movement(0.0, 10_000.0);
        assert!((camera.pitch - MAX_PITCH).abs() < EPSILON, "pitch {}", camera.pitch);
        camera.process_mouse_movement(0.0, -20_000.0);
        assert!((camera.pitch + MAX_PITCH).abs() < EPSILON, "pitch {}", camera.pitch);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::Y, -90.0, 0.0);
        camera.process_mouse_scroll(100.0);
        assert!((camera.zoom - MIN_ZOOM).abs() < EPSILON, "zoom {}", camera.zoom);
        camera.process_mouse_scroll(-100.0);
        assert!((camera.zoom - MAX_ZOOM).abs() < EPSILON, "zoom {}", camera.zoom);
    }

    #[test]
    fn keyboard_moves_along_front() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::Y, -90.0, 0.0);
        camera.movement_speed = 2.0;
        camera.process_keyboard(CameraMovement::Forward, 0.5);
        assert!(
            camera.position.abs_diff_eq(Vec3::NEG_Z, EPSILON),
            "position {}",
            camera.position
        );
        camera.process_keyboard(CameraMovement::Right, 0.5);
        assert!(
            camera.position.abs_diff_eq(Vec3::new(1.0, 0.0, -1.0), EPSILON),
            "position {}",
            camera.position
        );
    }

    #[test]
    fn rotation_matrix_drops_translation() {
        let camera = Camera::new(Vec3::new(0.0, 15.0, 15.0), Vec3::Y, -90.0, -45.0);
        let rotation = camera.rotation_matrix();
        assert!(
            rotation.w_axis.abs_diff_eq(glam::Vec4::W, EPSILON),
            "translation left: {}",
            rotation.w_axis
        );
    }
}
