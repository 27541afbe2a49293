//! World transforms of everything drawn on top of the ground plane.

use std::f32::consts::PI;

use glam::{Mat4, Quat, Vec3, Vec3Swizzles};

use crate::{avatar::Avatar, board::Board, game_state::GameState};

pub(crate) const MARKER_SCALE: f32 = 0.2;
pub(crate) const PLANE_HEIGHT: f32 = -0.15;
const AVATAR_HEIGHT: f32 = 0.2;
const HALO_HEIGHT: f32 = 0.15;
/// halo size relative to the avatar
const HALO_RATIO: f32 = 0.6;
const ARROW_HEIGHT: f32 = 0.25;
/// horizontal distance between the avatar's center and an arrow's center
const ARROW_OFFSET: f32 = 0.8;
const ARROW_SCALE: f32 = 0.4;

/// A movement hint arrow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Hint {
    pub(crate) transform: Mat4,
    /// the arrow points at the waypoint the avatar is walking to
    pub(crate) highlighted: bool,
}

pub(crate) fn plane_transform(size: f32) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::new(size, 1.0, size),
        Quat::IDENTITY,
        Vec3::Y * PLANE_HEIGHT,
    )
}

pub(crate) fn marker_transforms(board: &Board) -> impl Iterator<Item = Mat4> + '_ {
    board.waypoints().iter().map(|waypoint| {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(MARKER_SCALE),
            Quat::IDENTITY,
            waypoint.position(),
        )
    })
}

pub(crate) fn avatar_transform(avatar: &Avatar) -> Mat4 {
    let position = avatar.position();
    Mat4::from_scale_rotation_translation(
        Vec3::splat(avatar.scale()),
        Quat::IDENTITY,
        Vec3::new(position.x, AVATAR_HEIGHT, position.z),
    )
}

/// The marker model turned upside down below the avatar.
pub(crate) fn halo_transform(avatar: &Avatar) -> Mat4 {
    let position = avatar.position();
    Mat4::from_scale_rotation_translation(
        Vec3::splat(avatar.scale() * HALO_RATIO),
        Quat::from_rotation_z(PI),
        Vec3::new(position.x, HALO_HEIGHT, position.z),
    )
}

/// Places an arrow model (pointing along +X) next to `from`, turned towards `to`.
///
/// Returns `None` if both points share the same horizontal position.
pub(crate) fn arrow_transform(from: Vec3, to: Vec3) -> Option<Mat4> {
    let direction = (to.xz() - from.xz()).try_normalize()?;
    // turning +X by `angle` around +Y yields (cos, 0, -sin)
    let angle = (-direction.y).atan2(direction.x);
    let center = from.xz() + direction * ARROW_OFFSET;

    Some(Mat4::from_scale_rotation_translation(
        Vec3::splat(ARROW_SCALE),
        Quat::from_rotation_y(angle),
        Vec3::new(center.x, ARROW_HEIGHT, center.y),
    ))
}

/// One arrow per neighbour while idle, a single highlighted arrow to the target while moving.
pub(crate) fn hints(state: &GameState) -> Vec<Hint> {
    let (board, avatar) = (state.board(), state.avatar());
    let from = avatar.position();

    let arrow = |target, highlighted| {
        let to = board.get(target)?.position();
        let transform = arrow_transform(from, to)?;
        Some(Hint {
            transform,
            highlighted,
        })
    };

    match avatar.target() {
        Some(target) => arrow(target, true).into_iter().collect(),
        None => board
            .get(avatar.current())
            .map(|waypoint| waypoint.neighbours())
            .unwrap_or_default()
            .iter()
            .filter_map(|&neighbour| arrow(neighbour, false))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{board::WaypointId, config::AvatarConfig};
    use glam::Vec2;
    use rand::{rngs::StdRng, SeedableRng};

    /// Direction an arrow transform points to, projected onto the ground.
    fn pointing(transform: Mat4) -> Vec2 {
        transform.transform_vector3(Vec3::X).xz().normalize()
    }

    fn state() -> GameState {
        let mut board = Board::from_locations("0 0\n5 0\n0 5\n-3 -3\n");
        board.connect_all("0 1\n0 2\n0 3\n");
        GameState::with_rng(board, &AvatarConfig::default(), StdRng::seed_from_u64(0)).unwrap()
    }

    #[test]
    fn markers_sit_on_their_waypoints() {
        let state = state();
        let transforms = marker_transforms(state.board()).collect::<Vec<_>>();
        assert_eq!(transforms.len(), 4);
        let (scale, _, translation) = transforms[1].to_scale_rotation_translation();
        assert!(scale.abs_diff_eq(Vec3::splat(MARKER_SCALE), 1e-6), "scale {scale}");
        assert!(
            translation.abs_diff_eq(Vec3::new(5.0, 0.1, 0.0), 1e-6),
            "translation {translation}"
        );
    }

    #[test]
    fn arrows_point_at_their_targets() {
        let from = Vec3::new(1.0, 0.1, 1.0);
        for to in [
            Vec3::new(4.0, 0.1, 1.0),
            Vec3::new(1.0, 0.1, 4.0),
            Vec3::new(-2.0, 0.1, 1.0),
            Vec3::new(-1.0, 0.1, -3.0),
        ] {
            let transform = arrow_transform(from, to).unwrap();
            let expected = (to.xz() - from.xz()).normalize();
            assert!(
                pointing(transform).abs_diff_eq(expected, 1e-5),
                "arrow towards {to} points to {}",
                pointing(transform)
            );

            let center = transform.transform_point3(Vec3::ZERO);
            assert!(
                (center.xz().distance(from.xz()) - ARROW_OFFSET).abs() < 1e-5,
                "arrow is placed next to the avatar"
            );
        }
    }

    #[test]
    fn no_arrow_without_horizontal_distance() {
        assert!(arrow_transform(Vec3::ONE, Vec3::new(1.0, 7.0, 1.0)).is_none());
    }

    #[test]
    fn idle_avatar_shows_all_neighbours() {
        let state = state();
        let hints = hints(&state);
        assert_eq!(hints.len(), 3, "one arrow per neighbour");
        assert!(hints.iter().all(|hint| !hint.highlighted));
        assert!(pointing(hints[1].transform).abs_diff_eq(Vec2::Y, 1e-5));
    }

    #[test]
    fn moving_avatar_shows_its_target_only() {
        let mut state = state();
        state.walk_to_neighbour(2);
        assert_eq!(state.avatar().target(), Some(WaypointId(3)));

        let hints = hints(&state);
        assert_eq!(hints.len(), 1, "single arrow");
        assert!(hints[0].highlighted);
        assert!(pointing(hints[0].transform)
            .abs_diff_eq(Vec2::new(-1.0, -1.0).normalize(), 1e-5));
    }

    #[test]
    fn halo_is_flipped_below_the_avatar() {
        let state = state();
        let halo = halo_transform(state.avatar());
        let up = halo.transform_vector3(Vec3::Y);
        assert!(up.y < 0.0, "halo faces down");
        let avatar = avatar_transform(state.avatar()).transform_point3(Vec3::ZERO);
        assert!(halo.transform_point3(Vec3::ZERO).y < avatar.y);
    }
}
