use glam::{Vec3, Vec3Swizzles};
use log::{debug, info, warn};
use rand::{seq::SliceRandom, Rng};

use crate::board::{Board, WaypointId};

/// Horizontal distance below which a move is considered complete.
pub const ARRIVAL_THRESHOLD: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Movement {
    Idle,
    Moving { target: WaypointId },
}

/// The player controlled figure, always bound to the waypoint it last arrived at.
#[derive(Clone, Debug)]
pub struct Avatar {
    current: WaypointId,
    movement: Movement,
    position: Vec3,
    scale: f32,
    /// fraction of the remaining distance covered per tick
    speed: f32,
}

impl Avatar {
    /// Places an idle avatar on `start`.
    ///
    /// Returns `None` if `start` is not part of `board`.
    #[must_use]
    pub fn new(board: &Board, start: WaypointId, speed: f32, scale: f32) -> Option<Self> {
        let position = board.get(start)?.position();
        Some(Self {
            current: start,
            movement: Movement::Idle,
            position,
            scale,
            speed,
        })
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn current(&self) -> WaypointId {
        self.current
    }

    #[must_use]
    pub fn target(&self) -> Option<WaypointId> {
        match self.movement {
            Movement::Idle => None,
            Movement::Moving { target } => Some(target),
        }
    }

    #[must_use]
    pub fn movement(&self) -> Movement {
        self.movement
    }

    #[must_use]
    pub fn is_moving(&self) -> bool {
        matches!(self.movement, Movement::Moving { .. })
    }

    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Starts walking towards `target`, abandoning any move in progress.
    ///
    /// Walking to the waypoint the avatar is bound to is ignored.
    pub fn set_movement_target(&mut self, target: WaypointId) {
        if target == self.current {
            debug!("avatar is already bound to waypoint {target}");
            return;
        }
        debug!("avatar heading from waypoint {} to {target}", self.current);
        self.movement = Movement::Moving { target };
    }

    /// Picks a random neighbour of the current waypoint as target, unless already moving.
    pub fn set_random_movement_target(&mut self, board: &Board, rng: &mut impl Rng) {
        if self.is_moving() {
            return;
        }
        let Some(current) = board.get(self.current) else {
            warn!("avatar is bound to unknown waypoint {}", self.current);
            return;
        };
        match current.neighbours().choose(rng) {
            Some(&target) => self.set_movement_target(target),
            None => info!("waypoint {} has no neighbours", self.current),
        }
    }

    /// Advances the avatar by one tick.
    pub fn update(&mut self, board: &Board) {
        let Movement::Moving { target } = self.movement else {
            return;
        };
        let Some(target_position) = board.get(target).map(|waypoint| waypoint.position()) else {
            warn!("dropping move towards unknown waypoint {target}");
            self.movement = Movement::Idle;
            return;
        };

        let direction = target_position.xz() - self.position.xz();
        let step = direction * self.speed;
        self.position.x += step.x;
        self.position.z += step.y;

        if self.position.xz().distance(target_position.xz()) < ARRIVAL_THRESHOLD {
            debug!("avatar arrived at waypoint {target}");
            self.current = target;
            self.movement = Movement::Idle;
            self.position = target_position;
        }
    }
}
