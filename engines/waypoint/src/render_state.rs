use glam::Vec3;
use lib_geometry::{Camera, Projection};
use lib_time::FrameClock;
use log::trace;
use waypoint_framework::event::FrameworkEvent;

use crate::{config::CameraConfig, game_state::GameState, input::Input, lighting::Lighting};

const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

/// Contains every information besides the game state that is required to render the scene.
pub(crate) struct RenderState {
    /// Frame timing, used for camera movement and to animate the lights.
    pub(crate) clock: FrameClock,
    pub(crate) camera: Camera,
    pub(crate) projection: Projection,
    /// lights of the current frame
    pub(crate) lighting: Lighting,
    input: Input,
}

impl RenderState {
    #[must_use]
    pub(crate) fn new(
        config: &CameraConfig,
        surface_size: (u32, u32),
        game_state: &GameState,
    ) -> Self {
        let mut camera = Camera::new(config.position, Vec3::Y, config.yaw, config.pitch);
        camera.zoom = config.zoom;
        camera.movement_speed = config.movement_speed;
        camera.mouse_sensitivity = config.mouse_sensitivity;

        let projection =
            Projection::new_perspective(surface_size, camera.zoom.to_radians(), Z_NEAR..Z_FAR);

        Self {
            clock: FrameClock::new(),
            camera,
            projection,
            lighting: Lighting::around(game_state.avatar().position(), 0.0),
            input: Input::default(),
        }
    }

    pub(crate) fn process_event(&mut self, event: &FrameworkEvent) {
        self.input.process_event(event);
    }

    /// Advances one frame: applies the collected input, moves the avatar and then the lights.
    pub(crate) fn update(&mut self, game_state: &mut GameState) {
        let delta = self.clock.tick();
        trace!("frame {} after {delta:?}", self.clock.frames());
        let delta_time = delta.as_secs_f32();

        self.input.apply(&mut self.camera, game_state, delta_time);
        self.projection.set_fov(self.camera.zoom.to_radians());

        game_state.update();

        let time = self.clock.elapsed().as_secs_f32();
        self.lighting = Lighting::around(game_state.avatar().position(), time);
    }
}
