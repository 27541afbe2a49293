#![allow(missing_docs, reason = "TODO add later")]

mod model;
mod renderer;

pub use model::{Model, Vertex};
pub use renderer::{ObjectUniform, Renderer as GltfModelRenderer, RendererDescriptor};
