//! The graph of waypoints the avatar walks on.
//!
//! Waypoints live in a single table owned by [`Board`] and refer to each other by [`WaypointId`].

use std::{
    fmt::{self, Display},
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

use glam::Vec3;
use log::{debug, info, warn};
use serde::Deserialize;

/// Height at which all waypoints hover above the ground plane.
pub const MARKER_HEIGHT: f32 = 0.1;

/// Index of a waypoint within its [`Board`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct WaypointId(pub usize);

impl Display for WaypointId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(formatter)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    id: WaypointId,
    position: Vec3,
    neighbours: Vec<WaypointId>,
}

impl Waypoint {
    /// Creates an unconnected waypoint at the given map coordinates.
    #[must_use]
    pub fn new(id: WaypointId, x: f32, y: f32) -> Self {
        Self {
            id,
            position: Vec3::new(x, MARKER_HEIGHT, y),
            neighbours: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> WaypointId {
        self.id
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Neighbours in the order they were connected.
    #[must_use]
    pub fn neighbours(&self) -> &[WaypointId] {
        &self.neighbours
    }

    /// Appends a one-way reference; neither duplicates nor self references are rejected.
    pub fn add_neighbour(&mut self, other: WaypointId) {
        self.neighbours.push(other);
    }

    #[must_use]
    pub fn neighbour_count(&self) -> usize {
        self.neighbours.len()
    }
}

#[derive(Debug)]
pub enum BoardError {
    Io { path: PathBuf, source: io::Error },
    /// The locations file did not contain a single waypoint.
    Empty { path: PathBuf },
}

impl Display for BoardError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(formatter, "failed to read {}: {source}", path.display())
            }
            Self::Empty { path } => {
                write!(formatter, "{} does not contain any waypoints", path.display())
            }
        }
    }
}

impl std::error::Error for BoardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Empty { .. } => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Board {
    waypoints: Vec<Waypoint>,
}

impl Board {
    /// Reads the waypoint locations and their connections from two text files.
    ///
    /// # Errors
    ///
    /// Fails if either file cannot be read or if there are no waypoints at all.
    pub fn load(locations_path: &Path, connections_path: &Path) -> Result<Self, BoardError> {
        let locations = read(locations_path)?;
        let mut board = Self::from_locations(&locations);
        if board.is_empty() {
            return Err(BoardError::Empty {
                path: locations_path.to_owned(),
            });
        }

        let connections = read(connections_path)?;
        board.connect_all(&connections);

        info!(
            "loaded {} waypoints from {}",
            board.len(),
            locations_path.display()
        );
        board.log_waypoints();
        Ok(board)
    }

    /// Creates one unconnected waypoint per pair of coordinates, in order.
    #[must_use]
    pub fn from_locations(source: &str) -> Self {
        let waypoints = parse_pairs::<f32>(source)
            .into_iter()
            .enumerate()
            .map(|(index, (x, y))| Waypoint::new(WaypointId(index), x, y))
            .collect();
        Self { waypoints }
    }

    /// Connects each pair of waypoint ids found in `source`.
    ///
    /// Pairs referring to unknown waypoints are skipped.
    pub fn connect_all(&mut self, source: &str) {
        for (a, b) in parse_pairs::<usize>(source) {
            let (a, b) = (WaypointId(a), WaypointId(b));
            if !self.connect(a, b) {
                warn!(
                    "skipping connection {a} - {b}: the board only has {} waypoints",
                    self.len()
                );
            }
        }
    }

    /// Adds a bidirectional edge between `a` and `b`.
    ///
    /// Returns `false` without changing anything if either id is unknown.
    pub fn connect(&mut self, a: WaypointId, b: WaypointId) -> bool {
        if a.0 >= self.len() || b.0 >= self.len() {
            return false;
        }
        if let Some(waypoint) = self.waypoints.get_mut(a.0) {
            waypoint.add_neighbour(b);
        }
        if let Some(waypoint) = self.waypoints.get_mut(b.0) {
            waypoint.add_neighbour(a);
        }
        true
    }

    #[must_use]
    pub fn get(&self, id: WaypointId) -> Option<&Waypoint> {
        self.waypoints.get(id.0)
    }

    #[must_use]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    fn log_waypoints(&self) {
        for waypoint in &self.waypoints {
            let position = waypoint.position();
            debug!(
                "waypoint {} at [{}, {}]",
                waypoint.id(),
                position.x,
                position.z
            );
            if waypoint.neighbours().is_empty() {
                debug!("waypoint {} has no neighbours", waypoint.id());
            } else {
                debug!(
                    "neighbours of waypoint {}: {:?}",
                    waypoint.id(),
                    waypoint.neighbours().iter().map(|id| id.0).collect::<Vec<_>>()
                );
            }
        }
    }
}

fn read(path: &Path) -> Result<String, BoardError> {
    fs::read_to_string(path).map_err(|source| BoardError::Io {
        path: path.to_owned(),
        source,
    })
}

/// Reads whitespace separated values two at a time.
///
/// Stops at the first token that fails to parse or is not a finite number and drops a trailing
/// unpaired value.
fn parse_pairs<T: FromStr + Finite>(source: &str) -> Vec<(T, T)> {
    let mut pairs = Vec::new();
    let mut tokens = source.split_whitespace();
    loop {
        let Some(first) = tokens.next() else {
            break;
        };
        let Some(second) = tokens.next() else {
            warn!("ignoring unpaired trailing value {first:?}");
            break;
        };
        match (first.parse::<T>(), second.parse::<T>()) {
            (Ok(first), Ok(second)) if first.is_finite() && second.is_finite() => {
                pairs.push((first, second));
            }
            _ => {
                warn!("stopped reading at malformed pair {first:?} {second:?}");
                break;
            }
        }
    }
    pairs
}

/// Rejects parsed values that are not real numbers, like `nan` or `inf` for coordinates.
trait Finite {
    fn is_finite(&self) -> bool;
}

impl Finite for f32 {
    fn is_finite(&self) -> bool {
        f32::is_finite(*self)
    }
}

impl Finite for usize {
    fn is_finite(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Board {
        let mut board = Board::from_locations("0 0\n4 0\n4 4\n0 4\n");
        board.connect_all("0 1\n1 2\n2 3\n3 0\n0 2\n");
        board
    }

    #[test]
    fn locations_become_waypoints_above_the_ground() {
        let board = Board::from_locations("1.5 -2\n3 4");
        assert_eq!(board.len(), 2, "waypoint count");
        let second = board.get(WaypointId(1)).unwrap();
        assert_eq!(second.id(), WaypointId(1), "id follows file order");
        assert_eq!(
            second.position(),
            Vec3::new(3.0, MARKER_HEIGHT, 4.0),
            "y of the file becomes z"
        );
    }

    #[test]
    fn connections_are_symmetric() {
        let board = square();
        for waypoint in board.waypoints() {
            for &neighbour in waypoint.neighbours() {
                let other = board.get(neighbour).unwrap();
                assert!(
                    other.neighbours().contains(&waypoint.id()),
                    "{} is missing back reference to {}",
                    other.id(),
                    waypoint.id()
                );
            }
        }
        assert_eq!(
            board.get(WaypointId(0)).unwrap().neighbours(),
            &[WaypointId(1), WaypointId(3), WaypointId(2)],
            "neighbours keep the connection order"
        );
        assert_eq!(board.get(WaypointId(1)).unwrap().neighbour_count(), 2);
    }

    #[test]
    fn duplicate_connections_are_kept() {
        let mut board = Board::from_locations("0 0 1 1");
        board.connect_all("0 1 1 0");
        assert_eq!(board.get(WaypointId(0)).unwrap().neighbour_count(), 2);
    }

    #[test]
    fn parsing_stops_at_malformed_token() {
        let board = Board::from_locations("0 0\n1 1\n2 oops\n3 3\n");
        assert_eq!(board.len(), 2, "everything after the bad token is dropped");
    }

    #[test]
    fn parsing_stops_at_non_finite_coordinates() {
        let board = Board::from_locations("0 0\nnan inf\n3 3\n");
        assert_eq!(board.len(), 1, "nan and inf end the file like any bad token");
        assert!(board.waypoints().iter().all(|waypoint| waypoint.position().is_finite()));

        let board = Board::from_locations("1 2\n-inf 0\n");
        assert_eq!(board.len(), 1, "waypoint count");
    }

    #[test]
    fn unpaired_trailing_value_is_dropped() {
        let board = Board::from_locations("0 0 1 1 7");
        assert_eq!(board.len(), 2, "waypoint count");
    }

    #[test]
    fn unknown_ids_are_skipped() {
        let mut board = Board::from_locations("0 0 1 1");
        board.connect_all("0 1\n1 5\n");
        assert_eq!(board.get(WaypointId(0)).unwrap().neighbour_count(), 1);
        assert_eq!(
            board.get(WaypointId(1)).unwrap().neighbours(),
            &[WaypointId(0)],
            "out of range edge was not added"
        );
        assert!(!board.connect(WaypointId(2), WaypointId(0)), "unknown id");
    }

    #[test]
    fn load_reports_missing_and_empty_files() {
        let dir = std::env::temp_dir().join(format!("engine-waypoint-board-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let locations = dir.join("locations.txt");
        let connections = dir.join("connections.txt");
        let missing = dir.join("missing.txt");

        fs::write(&locations, "").unwrap();
        fs::write(&connections, "0 1").unwrap();
        assert!(
            matches!(
                Board::load(&locations, &connections),
                Err(BoardError::Empty { .. })
            ),
            "empty locations"
        );
        assert!(
            matches!(
                Board::load(&missing, &connections),
                Err(BoardError::Io { .. })
            ),
            "missing locations"
        );

        fs::write(&locations, "0 0\n2 0\n").unwrap();
        let board = Board::load(&locations, &connections).unwrap();
        assert_eq!(board.get(WaypointId(1)).unwrap().neighbours(), &[WaypointId(0)]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
