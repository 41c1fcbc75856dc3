//! Transform node storage and the tree algorithms.
//!
//! The arena owns every node; handles address nodes by key. Keeping the whole
//! tree behind one `RwLock` gives every tree operation a single exclusion
//! scope, so a render thread pulling world coordinates can never observe a
//! half-linked hierarchy.

use parking_lot::RwLock;
use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

use crate::foundation::math::{axis_angle, Quat, Vec3};
use crate::scene::transform::Space;

new_key_type! {
    /// Stable key of a transform node in the scene graph arena.
    pub struct TransformKey;
}

/// Errors raised by scene graph mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    /// Reparenting onto the node itself or one of its descendants.
    #[error("reparenting would create a cycle in the transform tree")]
    Cycle,
    /// The node or the requested parent no longer exists in the arena.
    #[error("transform node no longer exists")]
    Detached,
    /// The two transforms belong to different scene graphs.
    #[error("transforms belong to different scene graphs")]
    DifferentGraphs,
}

/// A node's local state plus its cached world-space state.
struct Node {
    parent: Option<TransformKey>,
    children: Vec<TransformKey>,
    local_position: Vec3,
    local_rotation: Quat,
    world_position: Vec3,
    world_rotation: Quat,
    dirty: bool,
}

impl Node {
    fn new() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            local_position: Vec3::zeros(),
            local_rotation: Quat::identity(),
            world_position: Vec3::zeros(),
            world_rotation: Quat::identity(),
            // Dirty from birth so the first world read computes the cache.
            dirty: true,
        }
    }
}

type Nodes = SlotMap<TransformKey, Node>;

/// Arena of transform nodes for one world.
pub struct SceneGraph {
    nodes: RwLock<Nodes>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create an empty scene graph.
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(SlotMap::with_key()),
        }
    }

    /// Insert a fresh root node and return its key.
    pub(crate) fn insert_node(&self) -> TransformKey {
        self.nodes.write().insert(Node::new())
    }

    /// Remove a node. Its children become roots; the node is unlinked from
    /// its former parent. Handles to the removed node go inert.
    pub(crate) fn remove_node(&self, key: TransformKey) {
        let mut nodes = self.nodes.write();
        let Some(node) = nodes.remove(key) else {
            return;
        };
        if let Some(parent) = node.parent {
            if let Some(parent_node) = nodes.get_mut(parent) {
                parent_node.children.retain(|child| *child != key);
            }
        }
        for child in node.children {
            if let Some(child_node) = nodes.get_mut(child) {
                child_node.parent = None;
            }
            mark_dirty(&mut nodes, child);
        }
    }

    /// Whether the node still exists.
    pub(crate) fn contains(&self, key: TransformKey) -> bool {
        self.nodes.read().contains_key(key)
    }

    pub(crate) fn parent_of(&self, key: TransformKey) -> Option<TransformKey> {
        self.nodes.read().get(key).and_then(|node| node.parent)
    }

    pub(crate) fn children_of(&self, key: TransformKey) -> Vec<TransformKey> {
        self.nodes
            .read()
            .get(key)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    pub(crate) fn root_of(&self, key: TransformKey) -> TransformKey {
        let nodes = self.nodes.read();
        let mut current = key;
        while let Some(parent) = nodes.get(current).and_then(|node| node.parent) {
            current = parent;
        }
        current
    }

    /// Relink `key` under `new_parent` (`None` makes it a root).
    ///
    /// Removes the node from its old parent's child set first, so a node is
    /// never a child of two parents at once. Fails without mutating anything
    /// if the link would close a cycle.
    pub(crate) fn set_parent(
        &self,
        key: TransformKey,
        new_parent: Option<TransformKey>,
    ) -> Result<(), SceneError> {
        let mut nodes = self.nodes.write();
        if !nodes.contains_key(key) {
            return Err(SceneError::Detached);
        }
        if let Some(parent) = new_parent {
            if !nodes.contains_key(parent) {
                return Err(SceneError::Detached);
            }
            if parent == key || has_ancestor(&nodes, parent, key) {
                return Err(SceneError::Cycle);
            }
        }

        let old_parent = nodes[key].parent;
        if let Some(old) = old_parent {
            if let Some(old_node) = nodes.get_mut(old) {
                old_node.children.retain(|child| *child != key);
            }
        }
        nodes[key].parent = new_parent;
        if let Some(parent) = new_parent {
            nodes[parent].children.push(key);
        }

        // The ancestor chain changed, so the whole subtree's cache is stale.
        mark_dirty(&mut nodes, key);
        Ok(())
    }

    /// Orphan every child: clear its parent link and mark its subtree stale.
    pub(crate) fn detach_children(&self, key: TransformKey) {
        let mut nodes = self.nodes.write();
        let children = match nodes.get_mut(key) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in children {
            if let Some(child_node) = nodes.get_mut(child) {
                child_node.parent = None;
            }
            mark_dirty(&mut nodes, child);
        }
    }

    pub(crate) fn local_position(&self, key: TransformKey) -> Vec3 {
        self.nodes
            .read()
            .get(key)
            .map_or_else(Vec3::zeros, |node| node.local_position)
    }

    pub(crate) fn local_rotation(&self, key: TransformKey) -> Quat {
        self.nodes
            .read()
            .get(key)
            .map_or_else(Quat::identity, |node| node.local_rotation)
    }

    pub(crate) fn set_local_position(&self, key: TransformKey, position: Vec3) {
        let mut nodes = self.nodes.write();
        if let Some(node) = nodes.get_mut(key) {
            node.local_position = position;
            mark_dirty(&mut nodes, key);
        }
    }

    pub(crate) fn set_local_rotation(&self, key: TransformKey, rotation: Quat) {
        let mut nodes = self.nodes.write();
        if let Some(node) = nodes.get_mut(key) {
            node.local_rotation = rotation;
            mark_dirty(&mut nodes, key);
        }
    }

    /// Pull the cached world position, recomputing the dirty ancestor path
    /// first.
    pub(crate) fn world_position(&self, key: TransformKey) -> Vec3 {
        let mut nodes = self.nodes.write();
        recalculate(&mut nodes, key);
        nodes.get(key).map_or_else(Vec3::zeros, |node| node.world_position)
    }

    /// Pull the cached world rotation, recomputing the dirty ancestor path
    /// first.
    pub(crate) fn world_rotation(&self, key: TransformKey) -> Quat {
        let mut nodes = self.nodes.write();
        recalculate(&mut nodes, key);
        nodes
            .get(key)
            .map_or_else(Quat::identity, |node| node.world_rotation)
    }

    pub(crate) fn is_dirty(&self, key: TransformKey) -> bool {
        self.nodes.read().get(key).is_some_and(|node| node.dirty)
    }

    /// Translate the node.
    ///
    /// LOCAL space moves along the node's own current world basis, so "move
    /// forward" means along the facing direction regardless of ancestors.
    /// WORLD space applies the raw delta in world coordinates; with a rotated
    /// parent the delta is mapped into the parent's frame first, since local
    /// position is expressed there.
    pub(crate) fn translate(&self, key: TransformKey, delta: Vec3, space: Space) {
        let mut nodes = self.nodes.write();
        if !nodes.contains_key(key) {
            return;
        }
        let shift = match space {
            Space::Local => {
                recalculate(&mut nodes, key);
                nodes[key].world_rotation * delta
            }
            Space::World => match nodes[key].parent {
                Some(parent) => {
                    recalculate(&mut nodes, parent);
                    nodes[parent].world_rotation.inverse_transform_vector(&delta)
                }
                None => delta,
            },
        };
        nodes[key].local_position += shift;
        mark_dirty(&mut nodes, key);
    }

    /// Rotate the node by `theta` radians about `axis`.
    ///
    /// LOCAL space composes the new rotation in the node's own frame. WORLD
    /// space rotates about an axis fixed in world space: the axis is mapped
    /// into local space through the inverse of the current world rotation
    /// before composing.
    pub(crate) fn rotate(&self, key: TransformKey, theta: f32, axis: Vec3, space: Space) {
        let mut nodes = self.nodes.write();
        if !nodes.contains_key(key) {
            return;
        }
        let local_axis = match space {
            Space::Local => axis,
            Space::World => {
                recalculate(&mut nodes, key);
                nodes[key].world_rotation.inverse_transform_vector(&axis)
            }
        };
        let node = &mut nodes[key];
        node.local_rotation *= axis_angle(local_axis, theta);
        // Repeated compositions drift off unit length.
        if (node.local_rotation.norm_squared() - 1.0).abs() > f32::EPSILON {
            node.local_rotation.renormalize();
        }
        mark_dirty(&mut nodes, key);
    }
}

/// Set the dirty flag on `key` and, transitively, every descendant.
/// Invalidation is eager even though recomputation is deferred.
fn mark_dirty(nodes: &mut Nodes, key: TransformKey) {
    let children = match nodes.get_mut(key) {
        Some(node) => {
            node.dirty = true;
            node.children.clone()
        }
        None => return,
    };
    for child in children {
        mark_dirty(nodes, child);
    }
}

/// True if `ancestor` appears on `node`'s parent chain.
fn has_ancestor(nodes: &Nodes, node: TransformKey, ancestor: TransformKey) -> bool {
    let mut current = nodes.get(node).and_then(|n| n.parent);
    while let Some(key) = current {
        if key == ancestor {
            return true;
        }
        current = nodes.get(key).and_then(|n| n.parent);
    }
    false
}

/// Recompute the cached world state of `key` if stale.
///
/// Climbs to the root first so parents are always clean before their basis is
/// read. Only the climbed path is cleaned; descendants of `key` stay dirty
/// until they are individually pulled.
fn recalculate(nodes: &mut Nodes, key: TransformKey) {
    let parent = match nodes.get(key) {
        Some(node) => node.parent,
        None => return,
    };
    if let Some(parent) = parent {
        recalculate(nodes, parent);
    }

    let Some(node) = nodes.get(key) else {
        return;
    };
    if !node.dirty {
        return;
    }

    match parent {
        Some(parent_key) => {
            let (parent_position, parent_rotation) = {
                let parent_node = &nodes[parent_key];
                (parent_node.world_position, parent_node.world_rotation)
            };
            let right = parent_rotation * Vec3::x();
            let up = parent_rotation * Vec3::y();
            let forward = parent_rotation * Vec3::z();
            let node = &mut nodes[key];
            node.world_position = parent_position
                + right * node.local_position.x
                + up * node.local_position.y
                + forward * node.local_position.z;
            node.world_rotation = parent_rotation * node.local_rotation;
            node.dirty = false;
        }
        None => {
            let node = &mut nodes[key];
            node.world_position = node.local_position;
            node.world_rotation = node.local_rotation;
            node.dirty = false;
        }
    }
}
