#![allow(missing_docs, reason = "TODO remove before release")]

mod error;

use std::{fs, io, path::Path, process::ExitCode};

use engine_waypoint::{GameState, RendererBuilder, SceneConfig};
use error::{ApplicationError, ApplicationResult};
use log::{debug, error, info};
use serde::Deserialize;
use waypoint_framework::{
    application::Application, config::WindowConfig, event::ApplicationEvent,
    logging::init_logger, register_ctrlc,
};
use winit::event_loop::{ControlFlow, EventLoop};

const CONFIG_PATH: &str = "applications/waypoint/waypoint.json";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    window: WindowConfig,
    scene: SceneConfig,
}

impl Config {
    /// A missing file means defaults; a file that exists must parse.
    fn load(path: &Path) -> ApplicationResult<Self> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                info!("{} not found, using the default configuration", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ApplicationError::ReadConfig {
                    path: path.to_owned(),
                    source,
                })
            }
        };
        serde_json::from_str(&json).map_err(|source| ApplicationError::ParseConfig {
            path: path.to_owned(),
            source,
        })
    }
}

fn main() -> ExitCode {
    init_logger();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");
            error.into()
        }
    }
}

fn run() -> ApplicationResult<()> {
    let Config { window, scene } = Config::load(Path::new(CONFIG_PATH))?;
    debug!("configuration: {window:?} {scene:?}");

    let game_state = GameState::load(&scene.board, &scene.avatar)?;

    let event_loop = EventLoop::<ApplicationEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    register_ctrlc(event_loop.create_proxy());

    let mut application = Application::new(window, RendererBuilder::new(game_state, scene));

    info!("main: Entering event loop...");
    event_loop.run_app(&mut application)?;
    debug!("main: window event loop exited");

    match application.take_error() {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_configuration_parses() {
        let config: Config = serde_json::from_str(include_str!("../waypoint.json")).unwrap();
        assert_eq!(config.window.title, "Waypoint Walk");
        assert_eq!(config.scene.avatar.start.0, 0, "the walk starts at the first marker");
    }

    #[test]
    fn shipped_board_loads() {
        let workspace = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        let Config { scene, .. } = Config::load(&workspace.join(CONFIG_PATH)).unwrap();
        let game_state = GameState::load(
            &engine_waypoint::BoardConfig {
                locations: workspace.join(&scene.board.locations),
                connections: workspace.join(&scene.board.connections),
            },
            &scene.avatar,
        )
        .unwrap();

        let board = game_state.board();
        assert_eq!(board.len(), 12);
        assert!(
            board.waypoints().iter().all(|waypoint| waypoint.neighbour_count() > 0),
            "every marker can be reached"
        );
    }

    #[test]
    fn missing_file_means_defaults() {
        let config = Config::load(Path::new("does/not/exist.json")).unwrap();
        assert_eq!(config.window, WindowConfig::default());
    }
}
