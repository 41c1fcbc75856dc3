//! The capability unit attachable to an entity.

use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use thiserror::Error;

use crate::ecs::behaviour::Behaviour;
use crate::ecs::entity::Entity;
use crate::ecs::renderable::Renderable;

/// Errors raised by component attachment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComponentError {
    /// The component instance is already attached to an entity. Detach it
    /// first; a component has at most one owner at a time.
    #[error("component is already attached to an entity")]
    AlreadyOwned,
}

/// Book-keeping embedded in every component: the non-owning back-reference
/// to the owning entity and the scheduler's start/warn tracking.
///
/// The owner link is a `Weak` so a component can never keep its entity (or a
/// parent/child chain reached through it) alive.
#[derive(Debug, Default)]
pub struct ComponentBase {
    owner: Mutex<Option<Weak<Entity>>>,
    started: AtomicBool,
    requirement_warned: AtomicBool,
}

impl ComponentBase {
    /// Create an unowned base.
    pub fn new() -> Self {
        Self::default()
    }

    /// The owning entity, if this component is attached and the entity is
    /// still registered.
    pub fn owner(&self) -> Option<Arc<Entity>> {
        self.owner.lock().as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn has_owner(&self) -> bool {
        self.owner
            .lock()
            .as_ref()
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    pub(crate) fn set_owner(&self, entity: &Arc<Entity>) {
        *self.owner.lock() = Some(Arc::downgrade(entity));
    }

    pub(crate) fn clear_owner(&self) {
        *self.owner.lock() = None;
    }

    /// Returns true exactly once, on the call that transitions the component
    /// into its started state.
    pub(crate) fn mark_started(&self) -> bool {
        !self.started.swap(true, Ordering::Relaxed)
    }

    /// Returns true the first time an unmet requirement should be reported.
    pub(crate) fn mark_requirement_warned(&self) -> bool {
        !self.requirement_warned.swap(true, Ordering::Relaxed)
    }
}

/// A unit of capability/state attachable to exactly one entity at a time.
///
/// Implementors embed a [`ComponentBase`] and surface it through [`base`];
/// the two-line `base`/`as_any` boilerplate is the whole cost of being a
/// component:
///
/// ```
/// use scene_core::prelude::*;
/// use std::any::Any;
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Health {
///     base: ComponentBase,
///     points: std::sync::atomic::AtomicU32,
/// }
///
/// impl Component for Health {
///     fn base(&self) -> &ComponentBase {
///         &self.base
///     }
///     fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
///         self
///     }
/// }
/// ```
///
/// Capabilities are opt-in: a component that can be updated overrides
/// [`as_behaviour`](Component::as_behaviour), one that can be drawn
/// overrides [`as_renderable`](Component::as_renderable). Collaborators
/// query for the capability they need instead of downcasting blindly.
pub trait Component: Any + Send + Sync {
    /// The embedded ownership/scheduling state.
    fn base(&self) -> &ComponentBase;

    /// Type-erased self, used by the registry's typed queries.
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// The updatable capability, if this component has one.
    fn as_behaviour(&self) -> Option<&dyn Behaviour> {
        None
    }

    /// The drawable capability, if this component has one.
    fn as_renderable(&self) -> Option<&dyn Renderable> {
        None
    }

    /// Sibling component types this component depends on.
    ///
    /// Validated lazily, at first use by the scheduler rather than at attach
    /// time: a missing dependency is reported once and the component is
    /// skipped until it is satisfied.
    fn required_components(&self) -> Vec<TypeId> {
        Vec::new()
    }

    /// The owning entity, if attached.
    fn owner(&self) -> Option<Arc<Entity>> {
        self.base().owner()
    }
}
