#![allow(missing_docs, reason = "TODO remove before release")]

mod avatar;
mod board;
mod config;
mod game_state;
mod input;
mod lighting;
mod render_state;
mod renderer;
mod scene;

pub use avatar::{Avatar, Movement, ARRIVAL_THRESHOLD};
pub use board::{Board, BoardError, Waypoint, WaypointId, MARKER_HEIGHT};
pub use config::{
    AvatarConfig, BoardConfig, CameraConfig, ModelConfig, SceneConfig, SkyboxConfig,
};
pub use game_state::GameState;
pub use renderer::{Renderer, RendererBuilder};
