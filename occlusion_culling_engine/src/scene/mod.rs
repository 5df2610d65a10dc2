//! Scene module
//!
//! Bounding boxes, mesh and instance data, and the scene that renders
//! them with a per-frame technique.

mod aabb;
mod instances;
mod mesh;
mod scene;

pub use aabb::AABB;
pub use instances::{InstanceSet, SpawnVolume};
pub use mesh::{Mesh, Renderable};
pub use scene::{Scene, SceneConfig};
