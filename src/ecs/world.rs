//! The world: container and factory for entities.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::ecs::entity::{Entity, EntityId};
use crate::scene::{SceneGraph, Transform};

/// Errors raised by registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// Explicit-id creation collided with a registered entity.
    #[error("an entity with id={0} already exists")]
    IdTaken(EntityId),
}

/// Registry state guarded by the world's single exclusion scope.
struct Registry {
    /// Entities in stable insertion order. Iteration order is a documented
    /// design choice, not an accident of the map.
    order: Vec<Arc<Entity>>,
    /// Id index for O(1) lookup.
    by_id: HashMap<EntityId, Arc<Entity>>,
    next_id: u64,
}

impl Registry {
    fn allocate_id(&mut self) -> EntityId {
        // Skip over ids taken by explicit-id creation.
        loop {
            let id = EntityId::new(self.next_id);
            self.next_id += 1;
            if !self.by_id.contains_key(&id) {
                return id;
            }
        }
    }
}

/// The registry/factory owning all live entities.
///
/// One writer (the scheduler thread) and any number of reader threads
/// (render, input) share a world; every lookup, snapshot, and mutation
/// acquires the same lock around the underlying collection, so a reader
/// never observes a half-mutated entity list.
pub struct World {
    registry: Mutex<Registry>,
    scene: Arc<SceneGraph>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create an empty world with its own scene graph.
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry {
                order: Vec::new(),
                by_id: HashMap::new(),
                next_id: 1,
            }),
            scene: Arc::new(SceneGraph::new()),
        }
    }

    /// Create an entity with the given name and register it.
    ///
    /// The entity gets a fresh id, collision-checked against the current
    /// registry, and a transform already installed.
    pub fn create_entity(&self, name: impl Into<String>) -> Arc<Entity> {
        let mut registry = self.registry.lock();
        let id = registry.allocate_id();
        self.register(&mut registry, id, name.into())
    }

    /// Create an entity with an explicitly requested id.
    ///
    /// # Errors
    ///
    /// [`WorldError::IdTaken`] if the id is already registered; the registry
    /// is left unchanged.
    pub fn create_entity_with_id(
        &self,
        id: EntityId,
        name: impl Into<String>,
    ) -> Result<Arc<Entity>, WorldError> {
        let mut registry = self.registry.lock();
        if registry.by_id.contains_key(&id) {
            return Err(WorldError::IdTaken(id));
        }
        Ok(self.register(&mut registry, id, name.into()))
    }

    fn register(&self, registry: &mut Registry, id: EntityId, name: String) -> Arc<Entity> {
        let key = self.scene.insert_node();
        let transform = Transform::new(Arc::clone(&self.scene), key);
        let entity = Entity::new(id, name, transform);
        registry.by_id.insert(id, Arc::clone(&entity));
        registry.order.push(Arc::clone(&entity));
        log::debug!("created entity id={id} name={:?}", entity.name());
        entity
    }

    /// Destroy the given entity. Equivalent to [`destroy_entity`] with its
    /// id.
    ///
    /// [`destroy_entity`]: World::destroy_entity
    pub fn destroy(&self, entity: &Entity) -> bool {
        self.destroy_entity(entity.id())
    }

    /// Destroy the entity with the given id.
    ///
    /// Returns whether an entity was registered under the id and removed.
    /// The entity's transform node is removed from the scene graph — its
    /// children become roots — and its components lose their owner
    /// reference; the components themselves are not torn down further.
    pub fn destroy_entity(&self, id: EntityId) -> bool {
        let removed = {
            let mut registry = self.registry.lock();
            match registry.by_id.remove(&id) {
                Some(entity) => {
                    registry.order.retain(|candidate| candidate.id() != id);
                    Some(entity)
                }
                None => None,
            }
        };
        match removed {
            Some(entity) => {
                self.scene.remove_node(entity.transform().key());
                for component in entity.components() {
                    component.base().clear_owner();
                }
                log::debug!("destroyed entity id={id}");
                true
            }
            None => false,
        }
    }

    /// O(1) — the entity with the given id, if registered.
    pub fn entity(&self, id: EntityId) -> Option<Arc<Entity>> {
        self.registry.lock().by_id.get(&id).cloned()
    }

    /// O(n) — the first entity with the given name, in insertion order.
    /// Ambiguous when duplicate names exist.
    pub fn entity_by_name(&self, name: &str) -> Option<Arc<Entity>> {
        self.registry
            .lock()
            .order
            .iter()
            .find(|entity| entity.name() == name)
            .cloned()
    }

    /// O(n) — every entity with the given name, in insertion order.
    pub fn entities_by_name(&self, name: &str) -> Vec<Arc<Entity>> {
        self.registry
            .lock()
            .order
            .iter()
            .filter(|entity| entity.name() == name)
            .cloned()
            .collect()
    }

    /// A point-in-time snapshot of the entities, in insertion order.
    ///
    /// Safe to iterate while the registry is concurrently mutated; the
    /// snapshot keeps observing entities destroyed after it was taken.
    pub fn entities(&self) -> Vec<Arc<Entity>> {
        self.registry.lock().order.clone()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.registry.lock().order.len()
    }

    /// Whether no entities are registered.
    pub fn is_empty(&self) -> bool {
        self.registry.lock().order.is_empty()
    }
}
