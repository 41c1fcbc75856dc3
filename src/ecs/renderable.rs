//! The drawable capability consumed by a rendering collaborator.
//!
//! Rendering itself lives outside this crate. The contract is narrow: the
//! collaborator walks [`World::entities`](crate::ecs::World::entities),
//! reads each entity's transform world position/rotation to establish a
//! model transform, and calls [`Renderable::draw`] with its own graphics
//! context.

use std::any::Any;

/// Marker for the active graphics context owned by the rendering
/// collaborator. Implementations downcast to their concrete context type
/// inside [`Renderable::draw`].
pub trait GraphicsContext: Any {}

/// The drawable capability of a component.
pub trait Renderable: Send + Sync {
    /// Submit draw commands for this component.
    fn draw(&self, ctx: &mut dyn GraphicsContext);
}
