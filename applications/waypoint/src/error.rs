use std::{
    fmt::{self, Display},
    io,
    path::PathBuf,
    process::ExitCode,
};

use engine_waypoint::BoardError;
use waypoint_framework::RenderSurfaceError;
use winit::error::EventLoopError;

pub(crate) type ApplicationResult<T> = Result<T, ApplicationError>;

#[derive(Debug)]
pub(crate) enum ApplicationError {
    ReadConfig { path: PathBuf, source: io::Error },
    ParseConfig { path: PathBuf, source: serde_json::Error },
    Board(BoardError),
    EventLoop(EventLoopError),
    RenderSurface(RenderSurfaceError),
}

impl Display for ApplicationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationError::ReadConfig { path, source } => {
                write!(formatter, "failed to read {}: {source}", path.display())
            }
            ApplicationError::ParseConfig { path, source } => {
                write!(formatter, "invalid configuration in {}: {source}", path.display())
            }
            ApplicationError::Board(error) => write!(formatter, "failed to load the board: {error}"),
            ApplicationError::EventLoop(error) => {
                write!(formatter, "window event loop failed: {error}")
            }
            ApplicationError::RenderSurface(error) => {
                write!(formatter, "graphics setup failed: {error}")
            }
        }
    }
}

impl From<BoardError> for ApplicationError {
    fn from(value: BoardError) -> Self {
        Self::Board(value)
    }
}

impl From<EventLoopError> for ApplicationError {
    fn from(value: EventLoopError) -> Self {
        Self::EventLoop(value)
    }
}

impl From<RenderSurfaceError> for ApplicationError {
    fn from(value: RenderSurfaceError) -> Self {
        Self::RenderSurface(value)
    }
}

impl From<ApplicationError> for ExitCode {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::ReadConfig { .. } | ApplicationError::ParseConfig { .. } => {
                ExitCode::from(2)
            }
            ApplicationError::Board(_) => ExitCode::from(3),
            ApplicationError::RenderSurface(_) => ExitCode::from(4),
            ApplicationError::EventLoop(_) => ExitCode::FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_failure_exits_with_its_own_code() {
        let config = ApplicationError::ReadConfig {
            path: PathBuf::from("waypoint.json"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        let board = ApplicationError::Board(BoardError::Empty {
            path: PathBuf::from("markerLocations.txt"),
        });
        let graphics = ApplicationError::RenderSurface(RenderSurfaceError::NoAdapter);

        assert_eq!(ExitCode::from(config), ExitCode::from(2));
        assert_eq!(ExitCode::from(board), ExitCode::from(3));
        assert_eq!(ExitCode::from(graphics), ExitCode::from(4));
    }

    #[test]
    fn graphics_failures_are_not_success() {
        for error in [
            RenderSurfaceError::NoAdapter,
            RenderSurfaceError::UnsupportedSurface,
            RenderSurfaceError::OutOfMemory,
        ] {
            let message = ApplicationError::from(error).to_string();
            assert!(message.starts_with("graphics setup failed"), "{message}");
        }
        assert_ne!(
            ExitCode::from(ApplicationError::from(RenderSurfaceError::NoAdapter)),
            ExitCode::SUCCESS
        );
    }
}
