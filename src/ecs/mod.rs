//! Entity/component registry.
//!
//! Entities are created and owned by the [`World`]; capabilities are
//! attached to them as [`Component`]s. The scheduler and the render
//! collaborator never assume what a component can do — they query for the
//! [`Behaviour`] and [`Renderable`] capability seams instead.

pub mod behaviour;
pub mod component;
pub mod entity;
pub mod renderable;
pub mod world;

#[cfg(test)]
mod tests;

pub use behaviour::{Behaviour, Collision, UpdateContext};
pub use component::{Component, ComponentBase, ComponentError};
pub use entity::{Entity, EntityId};
pub use renderable::{GraphicsContext, Renderable};
pub use world::{World, WorldError};
