//! Entities: named, uniquely identified containers of components.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::ecs::component::{Component, ComponentError};
use crate::scene::Transform;

/// Stable unique identifier of an entity within its owning world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a raw id, for explicit-id entity creation.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric id.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A container for components.
///
/// Entities are created only by [`World::create_entity`] and destroyed only
/// through the world; every entity carries exactly one [`Transform`] from
/// creation, installed outside the generic attach/detach path so it can
/// never be detached or duplicated.
///
/// The component list is shared between the scheduler thread and reader
/// threads; every query and mutation takes the same per-entity lock, and
/// iteration observes stable insertion order.
///
/// [`World::create_entity`]: crate::ecs::World::create_entity
pub struct Entity {
    id: EntityId,
    name: Mutex<String>,
    components: Mutex<Vec<Arc<dyn Component>>>,
    transform: Transform,
}

impl Entity {
    pub(crate) fn new(id: EntityId, name: String, transform: Transform) -> Arc<Self> {
        Arc::new(Self {
            id,
            name: Mutex::new(name),
            components: Mutex::new(Vec::new()),
            transform,
        })
    }

    /// The unique id bound to this entity.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The current name of this entity.
    pub fn name(&self) -> String {
        self.name.lock().clone()
    }

    /// Rename this entity.
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.lock() = name.into();
    }

    /// This entity's transform. Always present.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Attach the given component instance, making this entity its owner.
    ///
    /// # Errors
    ///
    /// [`ComponentError::AlreadyOwned`] if the instance is currently attached
    /// to an entity (including this one); the call mutates nothing.
    pub fn attach_component<T: Component>(
        self: &Arc<Self>,
        component: Arc<T>,
    ) -> Result<Arc<T>, ComponentError> {
        let mut components = self.components.lock();
        if component.base().has_owner() {
            return Err(ComponentError::AlreadyOwned);
        }
        component.base().set_owner(self);
        components.push(component.clone());
        Ok(component)
    }

    /// Construct a `T` with its `Default` and attach it.
    ///
    /// This is the registered-factory path for component types: resolution
    /// happens at compile time through the `Default` bound.
    pub fn attach_new<T: Component + Default>(self: &Arc<Self>) -> Arc<T> {
        let component = Arc::new(T::default());
        component.base().set_owner(self);
        self.components.lock().push(component.clone());
        component
    }

    /// Detach the component and clear its owner.
    ///
    /// Returns whether the component was present; a detached component can be
    /// freely attached to another entity afterwards.
    pub fn detach_component<T: Component>(&self, component: &Arc<T>) -> bool {
        let mut components = self.components.lock();
        let target = Arc::as_ptr(component).cast::<()>();
        match components
            .iter()
            .position(|candidate| Arc::as_ptr(candidate).cast::<()>() == target)
        {
            Some(index) => {
                components.remove(index);
                component.base().clear_owner();
                true
            }
            None => false,
        }
    }

    /// The first attached component of type `T`, in insertion order.
    pub fn component<T: Component>(&self) -> Option<Arc<T>> {
        self.components
            .lock()
            .iter()
            .find_map(|candidate| Arc::clone(candidate).as_any().downcast::<T>().ok())
    }

    /// All attached components of type `T`, in insertion order.
    pub fn components_of<T: Component>(&self) -> Vec<Arc<T>> {
        self.components
            .lock()
            .iter()
            .filter_map(|candidate| Arc::clone(candidate).as_any().downcast::<T>().ok())
            .collect()
    }

    /// Whether at least one component of type `T` is attached.
    pub fn has_component<T: Component>(&self) -> bool {
        self.component::<T>().is_some()
    }

    /// Whether the exact instance is attached to this entity.
    pub fn contains(&self, component: &Arc<dyn Component>) -> bool {
        let target = Arc::as_ptr(component).cast::<()>();
        self.components
            .lock()
            .iter()
            .any(|candidate| Arc::as_ptr(candidate).cast::<()>() == target)
    }

    /// Snapshot of all attached components, in insertion order.
    pub fn components(&self) -> Vec<Arc<dyn Component>> {
        self.components.lock().clone()
    }

    /// All components exposing the behaviour capability, in insertion order.
    pub fn behaviours(&self) -> Vec<Arc<dyn Component>> {
        self.components
            .lock()
            .iter()
            .filter(|candidate| candidate.as_behaviour().is_some())
            .cloned()
            .collect()
    }

    /// Whether a component with the given concrete type id is attached.
    pub fn has_component_type(&self, type_id: TypeId) -> bool {
        self.components
            .lock()
            .iter()
            .any(|candidate| (candidate.as_ref() as &dyn std::any::Any).type_id() == type_id)
    }

    /// Whether every sibling type required by `component` is attached.
    pub fn requirements_met(&self, component: &dyn Component) -> bool {
        component
            .required_components()
            .iter()
            .all(|required| self.has_component_type(*required))
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &*self.name.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::ComponentBase;
    use crate::ecs::world::World;
    use std::any::Any;

    #[derive(Debug, Default)]
    struct Tag {
        base: ComponentBase,
    }

    impl Component for Tag {
        fn base(&self) -> &ComponentBase {
            &self.base
        }
        fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    #[derive(Default)]
    struct Other {
        base: ComponentBase,
    }

    impl Component for Other {
        fn base(&self) -> &ComponentBase {
            &self.base
        }
        fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
        fn required_components(&self) -> Vec<TypeId> {
            vec![TypeId::of::<Tag>()]
        }
    }

    fn entity() -> Arc<Entity> {
        World::new().create_entity("subject")
    }

    #[test]
    fn attach_sets_owner_and_detach_clears_it() {
        let entity = entity();
        let tag = entity.attach_new::<Tag>();
        assert_eq!(tag.owner().unwrap().id(), entity.id());
        assert!(entity.has_component::<Tag>());

        assert!(entity.detach_component(&tag));
        assert!(tag.owner().is_none());
        assert!(!entity.has_component::<Tag>());
        // Second detach of the same instance finds nothing.
        assert!(!entity.detach_component(&tag));
    }

    #[test]
    fn attaching_an_owned_instance_is_rejected() {
        let world = World::new();
        let first = world.create_entity("first");
        let second = world.create_entity("second");
        let tag = first.attach_new::<Tag>();

        let err = second.attach_component(Arc::clone(&tag)).unwrap_err();
        assert_eq!(err, ComponentError::AlreadyOwned);
        assert!(!second.has_component::<Tag>());
        assert_eq!(tag.owner().unwrap().id(), first.id());
    }

    #[test]
    fn detached_instance_can_move_to_another_entity() {
        let world = World::new();
        let first = world.create_entity("first");
        let second = world.create_entity("second");
        let tag = first.attach_new::<Tag>();

        assert!(first.detach_component(&tag));
        second.attach_component(Arc::clone(&tag)).unwrap();
        assert_eq!(tag.owner().unwrap().id(), second.id());
    }

    #[test]
    fn typed_queries_preserve_insertion_order() {
        let entity = entity();
        let a = entity.attach_new::<Tag>();
        entity.attach_new::<Other>();
        let b = entity.attach_new::<Tag>();

        let first = entity.component::<Tag>().unwrap();
        assert!(Arc::ptr_eq(&first, &a));

        let tags = entity.components_of::<Tag>();
        assert_eq!(tags.len(), 2);
        assert!(Arc::ptr_eq(&tags[0], &a));
        assert!(Arc::ptr_eq(&tags[1], &b));
        assert_eq!(entity.components().len(), 3);
    }

    #[test]
    fn same_type_instances_are_distinguished_by_identity() {
        let entity = entity();
        let a = entity.attach_new::<Tag>();
        let b = entity.attach_new::<Tag>();

        assert!(entity.detach_component(&a));
        let remaining = entity.components_of::<Tag>();
        assert_eq!(remaining.len(), 1);
        assert!(Arc::ptr_eq(&remaining[0], &b));
    }

    #[test]
    fn requirement_checks_follow_sibling_presence() {
        let entity = entity();
        let other = entity.attach_new::<Other>();
        assert!(!entity.requirements_met(other.as_ref()));

        let tag = entity.attach_new::<Tag>();
        assert!(entity.requirements_met(other.as_ref()));

        entity.detach_component(&tag);
        assert!(!entity.requirements_met(other.as_ref()));
    }

    #[test]
    fn rename_is_visible_through_the_world() {
        let world = World::new();
        let entity = world.create_entity("before");
        entity.set_name("after");
        assert_eq!(entity.name(), "after");
        assert!(world.entity_by_name("before").is_none());
        assert_eq!(world.entity_by_name("after").unwrap().id(), entity.id());
    }
}
