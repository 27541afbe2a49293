//! Scene settings, read from the `scene` section of the application's JSON configuration.
//!
//! Every field has a default, so partial configurations are fine.

use std::path::PathBuf;

use glam::Vec3;
use serde::Deserialize;

use crate::board::WaypointId;

const ASSET_DIR: &str = "applications/waypoint/assets";

fn asset(name: &str) -> PathBuf {
    PathBuf::from(ASSET_DIR).join(name)
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub board: BoardConfig,
    pub models: ModelConfig,
    pub skybox: SkyboxConfig,
    pub avatar: AvatarConfig,
    pub camera: CameraConfig,
    /// linear RGB
    pub clear_color: [f64; 3],
    /// edge length of the square ground plane
    pub plane_size: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            models: ModelConfig::default(),
            skybox: SkyboxConfig::default(),
            avatar: AvatarConfig::default(),
            camera: CameraConfig::default(),
            clear_color: [0.25, 0.25, 0.25],
            plane_size: 20.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BoardConfig {
    pub locations: PathBuf,
    pub connections: PathBuf,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            locations: asset("markerLocations.txt"),
            connections: asset("markerConnections.txt"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModelConfig {
    pub marker: PathBuf,
    pub avatar: PathBuf,
    pub arrow: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            marker: asset("models/marker.gltf"),
            avatar: asset("models/avatar.gltf"),
            arrow: asset("models/arrow.gltf"),
        }
    }
}

/// The six faces of the sky cube map, in layer order.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SkyboxConfig {
    pub right: PathBuf,
    pub left: PathBuf,
    pub top: PathBuf,
    pub bottom: PathBuf,
    pub front: PathBuf,
    pub back: PathBuf,
}

impl SkyboxConfig {
    /// +X, -X, +Y, -Y, +Z, -Z
    #[must_use]
    pub fn faces(&self) -> [&PathBuf; 6] {
        [
            &self.right,
            &self.left,
            &self.top,
            &self.bottom,
            &self.front,
            &self.back,
        ]
    }
}

impl Default for SkyboxConfig {
    fn default() -> Self {
        Self {
            right: asset("skybox/right.png"),
            left: asset("skybox/left.png"),
            top: asset("skybox/top.png"),
            bottom: asset("skybox/bottom.png"),
            front: asset("skybox/front.png"),
            back: asset("skybox/back.png"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AvatarConfig {
    pub start: WaypointId,
    /// fraction of the remaining distance covered per frame
    pub speed: f32,
    pub scale: f32,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            start: WaypointId(0),
            speed: 0.01,
            scale: 0.5,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    /// degrees
    pub yaw: f32,
    /// degrees
    pub pitch: f32,
    /// vertical field of view in degrees
    pub zoom: f32,
    /// units per second
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 15.0, 15.0),
            yaw: -90.0,
            pitch: -45.0,
            zoom: 45.0,
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
        }
    }
}
