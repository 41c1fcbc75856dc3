//! Spatial scene graph: parent/child transforms with lazily cached
//! world-space state.
//!
//! Nodes live in a slotmap arena inside [`SceneGraph`]; a [`Transform`] is a
//! cheap cloneable handle into that arena. Parent and child links are plain
//! keys, never owning references, so the tree cannot form a reference cycle.
//! All reads and writes on the tree go through the arena's single lock.

pub mod graph;
pub mod transform;

pub use graph::{SceneError, SceneGraph, TransformKey};
pub use transform::{Space, Transform};
