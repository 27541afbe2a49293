use std::collections::HashSet;

use glam::Vec2;
use lib_geometry::{Camera, CameraMovement};
use log::trace;
use waypoint_framework::event::FrameworkEvent;
use winit::{
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::game_state::GameState;

/// Pixels of a touchpad scroll that amount to one wheel notch.
const PIXELS_PER_LINE: f64 = 20.0;

const CAMERA_KEYS: [(KeyCode, CameraMovement); 4] = [
    (KeyCode::KeyW, CameraMovement::Forward),
    (KeyCode::KeyS, CameraMovement::Backward),
    (KeyCode::KeyA, CameraMovement::Left),
    (KeyCode::KeyD, CameraMovement::Right),
];

const NEIGHBOUR_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// Collects input between two frames and applies it once per frame.
#[derive(Debug, Default)]
pub(crate) struct Input {
    held: HashSet<KeyCode>,
    /// neighbour indices requested by number keys, in order of the key presses
    neighbour_requests: Vec<usize>,
    /// accumulated mouse motion; positive y looks up
    mouse_delta: Vec2,
    scroll: f32,
}

impl Input {
    pub(crate) fn process_event(&mut self, event: &FrameworkEvent) {
        match event {
            FrameworkEvent::Window {
                event:
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                physical_key: PhysicalKey::Code(code),
                                state,
                                repeat,
                                ..
                            },
                        ..
                    },
            } => self.key(*code, *state, *repeat),
            FrameworkEvent::Window {
                event: WindowEvent::MouseWheel { delta, .. },
            } => {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "scroll distances are tiny"
                )]
                let lines = match *delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
                };
                self.scroll += lines;
            }
            FrameworkEvent::Window {
                event: WindowEvent::Focused(false),
            } => {
                trace!("focus lost, releasing all keys");
                self.held.clear();
            }
            FrameworkEvent::Device {
                event: DeviceEvent::MouseMotion { delta: (x, y) },
            } => {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "mouse deltas are tiny"
                )]
                let delta = Vec2::new(*x as f32, -*y as f32);
                self.mouse_delta += delta;
            }
            FrameworkEvent::Window { .. } | FrameworkEvent::Device { .. } => {}
        }
    }

    fn key(&mut self, code: KeyCode, state: ElementState, repeat: bool) {
        match state {
            ElementState::Pressed => {
                self.held.insert(code);
                if !repeat {
                    if let Some(index) = NEIGHBOUR_KEYS.iter().position(|&key| key == code) {
                        self.neighbour_requests.push(index);
                    }
                }
            }
            ElementState::Released => {
                self.held.remove(&code);
            }
        }
    }

    fn is_held(&self, code: KeyCode) -> bool {
        self.held.contains(&code)
    }

    /// Applies everything collected since the last frame; `delta_time` is in seconds.
    pub(crate) fn apply(&mut self, camera: &mut Camera, game_state: &mut GameState, delta_time: f32) {
        for (key, movement) in CAMERA_KEYS {
            if self.is_held(key) {
                camera.process_keyboard(movement, delta_time);
            }
        }

        let mouse_delta = std::mem::take(&mut self.mouse_delta);
        if mouse_delta != Vec2::ZERO {
            camera.process_mouse_movement(mouse_delta.x, mouse_delta.y);
        }

        let scroll = std::mem::take(&mut self.scroll);
        if scroll.abs() > f32::EPSILON {
            camera.process_mouse_scroll(scroll);
        }

        if self.is_held(KeyCode::ArrowUp) {
            game_state.walk_to_random_neighbour();
        }

        for index in self.neighbour_requests.drain(..) {
            game_state.walk_to_neighbour(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        board::{Board, WaypointId},
        config::AvatarConfig,
    };
    use glam::Vec3;
    use rand::{rngs::StdRng, SeedableRng};

    fn fixtures() -> (Camera, GameState) {
        let camera = Camera::new(Vec3::ZERO, Vec3::Y, -90.0, 0.0);
        let mut board = Board::from_locations("0 0\n1 0\n0 1\n");
        board.connect_all("0 1\n0 2\n");
        let game_state =
            GameState::with_rng(board, &AvatarConfig::default(), StdRng::seed_from_u64(9)).unwrap();
        (camera, game_state)
    }

    #[test]
    fn held_keys_move_the_camera_every_frame() {
        let (mut camera, mut game_state) = fixtures();
        let mut input = Input::default();
        input.key(KeyCode::KeyW, ElementState::Pressed, false);

        input.apply(&mut camera, &mut game_state, 0.5);
        input.apply(&mut camera, &mut game_state, 0.5);
        assert!(
            camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, -2.5), 1e-5),
            "camera at {}",
            camera.position
        );

        input.key(KeyCode::KeyW, ElementState::Released, false);
        input.apply(&mut camera, &mut game_state, 0.5);
        assert!(camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, -2.5), 1e-5));
    }

    #[test]
    fn number_keys_pick_neighbours_once() {
        let (mut camera, mut game_state) = fixtures();
        let mut input = Input::default();
        input.key(KeyCode::Digit2, ElementState::Pressed, false);
        input.key(KeyCode::Digit2, ElementState::Pressed, true);

        input.apply(&mut camera, &mut game_state, 0.0);
        assert_eq!(game_state.avatar().target(), Some(WaypointId(2)));
        assert!(input.neighbour_requests.is_empty(), "requests are consumed");
    }

    #[test]
    fn arrow_up_starts_a_random_move() {
        let (mut camera, mut game_state) = fixtures();
        let mut input = Input::default();
        input.apply(&mut camera, &mut game_state, 0.0);
        assert!(!game_state.avatar().is_moving());

        input.key(KeyCode::ArrowUp, ElementState::Pressed, false);
        input.apply(&mut camera, &mut game_state, 0.0);
        assert!(game_state.avatar().is_moving());
    }

    #[test]
    fn mouse_motion_is_consumed_per_frame() {
        let (mut camera, mut game_state) = fixtures();
        let mut input = Input::default();
        input.process_event(&FrameworkEvent::Device {
            event: DeviceEvent::MouseMotion { delta: (10.0, 20.0) },
        });
        input.process_event(&FrameworkEvent::Device {
            event: DeviceEvent::MouseMotion { delta: (10.0, 0.0) },
        });

        input.apply(&mut camera, &mut game_state, 0.0);
        assert!((camera.yaw - -88.0).abs() < 1e-4, "yaw {}", camera.yaw);
        assert!((camera.pitch - -2.0).abs() < 1e-4, "pitch {}", camera.pitch);

        input.apply(&mut camera, &mut game_state, 0.0);
        assert!((camera.yaw - -88.0).abs() < 1e-4, "no motion, no turn");
    }
}
