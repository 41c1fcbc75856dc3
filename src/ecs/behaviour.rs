//! The updatable-behaviour capability.
//!
//! Example uses: player movement from input devices, AI movement along a set
//! path. The scheduler drives these hooks; a physics collaborator drives the
//! collision/trigger hooks.

use std::sync::Arc;

use crate::ecs::component::Component;
use crate::ecs::entity::Entity;
use crate::ecs::world::World;
use crate::foundation::time::Clock;
use crate::scene::Transform;

/// Everything a behaviour may reach during a hook invocation.
///
/// Passed explicitly into every hook so behaviours have no hidden global
/// state; the clock here is the only notion of time a behaviour should use.
pub struct UpdateContext<'a> {
    /// The registry the owning entity lives in.
    pub world: &'a World,
    /// Simulation time for this frame.
    pub clock: &'a Clock,
    /// The entity whose component is being invoked.
    pub entity: &'a Arc<Entity>,
}

impl UpdateContext<'_> {
    /// Shorthand for the invoked entity's transform.
    pub fn transform(&self) -> &Transform {
        self.entity.transform()
    }
}

/// Describes a collision reported by the physics collaborator.
pub struct Collision {
    /// The entity that was hit.
    pub entity: Arc<Entity>,
    /// The collider component of the entity that was hit.
    pub collider: Arc<dyn Component>,
    /// The transform of the entity that was hit.
    pub transform: Transform,
}

/// The updatable capability of a component.
///
/// Hooks take `&self`: components are shared with concurrent readers, so
/// stateful behaviours keep their mutable state behind interior mutability
/// (an atomic or a small mutex). All hooks run to completion on the
/// scheduler thread before the next entity is processed.
pub trait Behaviour: Send + Sync {
    /// Called once, before the first update.
    fn start(&self, _ctx: &UpdateContext<'_>) {}

    /// Called once per variable-rate pass with the frame delta in seconds.
    fn update(&self, ctx: &UpdateContext<'_>, delta_seconds: f32);

    /// Called once per fixed-rate pass with the constant step in seconds.
    fn fixed_update(&self, _ctx: &UpdateContext<'_>, _fixed_delta_seconds: f32) {}

    /// A collision with another entity began.
    fn on_collision_enter(&self, _ctx: &UpdateContext<'_>, _collision: &Collision) {}

    /// A collision with another entity ended.
    fn on_collision_exit(&self, _ctx: &UpdateContext<'_>, _collision: &Collision) {}

    /// A collision with another entity is ongoing.
    fn on_collision_stay(&self, _ctx: &UpdateContext<'_>, _collision: &Collision) {}

    /// A trigger volume overlap began.
    fn on_trigger_enter(&self, _ctx: &UpdateContext<'_>, _collision: &Collision) {}

    /// A trigger volume overlap ended.
    fn on_trigger_exit(&self, _ctx: &UpdateContext<'_>, _collision: &Collision) {}

    /// A trigger volume overlap is ongoing.
    fn on_trigger_stay(&self, _ctx: &UpdateContext<'_>, _collision: &Collision) {}
}
