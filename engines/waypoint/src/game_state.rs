use log::{debug, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    avatar::Avatar,
    board::{Board, BoardError, WaypointId},
    config::{AvatarConfig, BoardConfig},
};

/// Steps of this fraction of the remaining distance or more overshoot without ever converging.
const MAX_SPEED: f32 = 2.0;

/// Contains every information about the current state of the game.
pub struct GameState {
    board: Board,
    avatar: Avatar,
    rng: StdRng,
}

impl GameState {
    /// Loads the board and places the avatar on its start waypoint.
    ///
    /// An unknown start waypoint is replaced by the first one.
    ///
    /// # Errors
    ///
    /// Fails if the board cannot be loaded.
    pub fn load(
        board_config: &BoardConfig,
        avatar_config: &AvatarConfig,
    ) -> Result<Self, BoardError> {
        let board = Board::load(&board_config.locations, &board_config.connections)?;
        Self::with_rng(board, avatar_config, StdRng::from_entropy()).ok_or_else(|| {
            BoardError::Empty {
                path: board_config.locations.clone(),
            }
        })
    }

    pub(crate) fn with_rng(
        board: Board,
        avatar_config: &AvatarConfig,
        rng: StdRng,
    ) -> Option<Self> {
        let start = if board.get(avatar_config.start).is_some() {
            avatar_config.start
        } else {
            warn!(
                "start waypoint {} does not exist, starting at waypoint 0",
                avatar_config.start
            );
            WaypointId(0)
        };
        let speed = if avatar_config.speed > 0.0 && avatar_config.speed < MAX_SPEED {
            avatar_config.speed
        } else {
            let fallback = AvatarConfig::default().speed;
            warn!(
                "avatar speed {} never reaches a waypoint, using {fallback}",
                avatar_config.speed
            );
            fallback
        };
        let avatar = Avatar::new(&board, start, speed, avatar_config.scale)?;

        Some(Self {
            board,
            avatar,
            rng,
        })
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    pub(crate) fn walk_to_random_neighbour(&mut self) {
        self.avatar
            .set_random_movement_target(&self.board, &mut self.rng);
    }

    /// Walks to the `index`-th neighbour (0-based) of the current waypoint, if it exists.
    pub(crate) fn walk_to_neighbour(&mut self, index: usize) {
        let target = self
            .board
            .get(self.avatar.current())
            .and_then(|waypoint| waypoint.neighbours().get(index).copied());
        match target {
            Some(target) => self.avatar.set_movement_target(target),
            None => debug!(
                "waypoint {} has no neighbour #{}",
                self.avatar.current(),
                index + 1
            ),
        }
    }

    pub(crate) fn update(&mut self) {
        self.avatar.update(&self.board);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_state(start: usize) -> GameState {
        let mut board = Board::from_locations("0 0\n3 0\n0 3\n");
        board.connect_all("0 1\n0 2\n");
        let avatar_config = AvatarConfig {
            start: WaypointId(start),
            ..AvatarConfig::default()
        };
        GameState::with_rng(board, &avatar_config, StdRng::seed_from_u64(5)).unwrap()
    }

    #[test]
    fn unknown_start_falls_back_to_first_waypoint() {
        let state = game_state(17);
        assert_eq!(state.avatar().current(), WaypointId(0));
    }

    #[test]
    fn unusable_speed_falls_back_to_default() {
        for speed in [0.0, -0.01, 2.0, 2.5, f32::NAN, f32::INFINITY] {
            let mut board = Board::from_locations("0 0\n10 0\n");
            board.connect_all("0 1\n");
            let avatar_config = AvatarConfig {
                speed,
                ..AvatarConfig::default()
            };
            let mut state =
                GameState::with_rng(board, &avatar_config, StdRng::seed_from_u64(5)).unwrap();

            state.walk_to_neighbour(0);
            for _ in 0..1_000 {
                state.update();
            }
            assert!(!state.avatar().is_moving(), "speed {speed}: move never ended");
            assert_eq!(state.avatar().current(), WaypointId(1), "speed {speed}");
        }
    }

    #[test]
    fn number_keys_select_neighbours_in_order() {
        let mut state = game_state(0);
        state.walk_to_neighbour(1);
        assert_eq!(state.avatar().target(), Some(WaypointId(2)));

        state.walk_to_neighbour(5);
        assert_eq!(
            state.avatar().target(),
            Some(WaypointId(2)),
            "missing neighbour leaves the move alone"
        );
    }

    #[test]
    fn update_moves_the_avatar() {
        let mut state = game_state(0);
        state.walk_to_random_neighbour();
        let start = state.avatar().position();
        state.update();
        state.update();
        assert_ne!(state.avatar().position(), start, "avatar moved");
    }
}
