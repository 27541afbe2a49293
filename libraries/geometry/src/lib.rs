#![allow(missing_docs, reason = "TODO add later")]

mod camera;
mod projection;

pub use camera::{Camera, CameraMovement};
pub use projection::Projection;
