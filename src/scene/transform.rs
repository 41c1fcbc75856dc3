//! Transform handle: an entity's position, rotation, and place in the tree.

use std::fmt;
use std::sync::Arc;

use crate::foundation::math::{world_forward, world_right, world_up, Quat, Vec3};
use crate::scene::graph::{SceneError, SceneGraph, TransformKey};

/// The space a translation or rotation is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    /// Relative to the node's own current orientation (strafe/walk/fly).
    Local,
    /// Fixed world coordinates, independent of ancestor rotation.
    World,
}

/// A position and rotation in 3D space, forming a node of the scene graph.
///
/// `Transform` is a handle into its world's transform arena; cloning it is
/// cheap and clones observe the same node. World-space state is cached and
/// recomputed lazily: mutating a node marks it and all descendants stale, and
/// the next world-space read pulls a fresh value.
///
/// Every entity owns exactly one `Transform`, installed at creation. It is
/// not a detachable component, so the tree can never lose a node while its
/// entity is alive.
#[derive(Clone)]
pub struct Transform {
    graph: Arc<SceneGraph>,
    key: TransformKey,
}

impl Transform {
    pub(crate) fn new(graph: Arc<SceneGraph>, key: TransformKey) -> Self {
        Self { graph, key }
    }

    pub(crate) fn key(&self) -> TransformKey {
        self.key
    }

    /// Whether the underlying node still exists. A destroyed entity's
    /// transform is inert: reads return identity values and writes are
    /// ignored.
    pub fn is_alive(&self) -> bool {
        self.graph.contains(self.key)
    }

    /// The parent transform, if any.
    pub fn parent(&self) -> Option<Transform> {
        self.graph
            .parent_of(self.key)
            .map(|key| Transform::new(Arc::clone(&self.graph), key))
    }

    /// Snapshot of the current children.
    pub fn children(&self) -> Vec<Transform> {
        self.graph
            .children_of(self.key)
            .into_iter()
            .map(|key| Transform::new(Arc::clone(&self.graph), key))
            .collect()
    }

    /// The topmost ancestor (self if this node is a root).
    pub fn root(&self) -> Transform {
        Transform::new(Arc::clone(&self.graph), self.graph.root_of(self.key))
    }

    /// Make this node a child of `parent`, unlinking it from its previous
    /// parent first.
    ///
    /// # Errors
    ///
    /// [`SceneError::Cycle`] if `parent` is this node or one of its
    /// descendants; [`SceneError::Detached`] if either node was destroyed;
    /// [`SceneError::DifferentGraphs`] if the nodes live in different worlds.
    pub fn set_parent(&self, parent: &Transform) -> Result<(), SceneError> {
        if !Arc::ptr_eq(&self.graph, &parent.graph) {
            return Err(SceneError::DifferentGraphs);
        }
        self.graph.set_parent(self.key, Some(parent.key))
    }

    /// Unlink this node from its parent, making it a root.
    pub fn clear_parent(&self) {
        // Clearing can neither cycle nor cross graphs; a dead node is a no-op.
        let _ = self.graph.set_parent(self.key, None);
    }

    /// Orphan all children: each becomes a root.
    pub fn detach_children(&self) {
        self.graph.detach_children(self.key);
    }

    /// Position relative to the parent (value copy).
    pub fn local_position(&self) -> Vec3 {
        self.graph.local_position(self.key)
    }

    /// Rotation relative to the parent (value copy).
    pub fn local_rotation(&self) -> Quat {
        self.graph.local_rotation(self.key)
    }

    /// Overwrite the local position.
    pub fn set_local_position(&self, position: Vec3) {
        self.graph.set_local_position(self.key, position);
    }

    /// Overwrite the local rotation.
    pub fn set_local_rotation(&self, rotation: Quat) {
        self.graph.set_local_rotation(self.key, rotation);
    }

    /// World-space position (value copy; triggers recomputation if stale).
    ///
    /// A root's world position equals its local position.
    pub fn world_position(&self) -> Vec3 {
        self.graph.world_position(self.key)
    }

    /// World-space rotation (value copy; triggers recomputation if stale).
    pub fn world_rotation(&self) -> Quat {
        self.graph.world_rotation(self.key)
    }

    /// The node's forward basis axis (+Z rotated by the world rotation).
    pub fn forward(&self) -> Vec3 {
        self.world_rotation() * world_forward()
    }

    /// The node's right basis axis (+X rotated by the world rotation).
    pub fn along(&self) -> Vec3 {
        self.world_rotation() * world_right()
    }

    /// The node's up basis axis (+Y rotated by the world rotation).
    pub fn up(&self) -> Vec3 {
        self.world_rotation() * world_up()
    }

    /// Translate by `delta` expressed in `space`. Marks the subtree stale.
    pub fn translate(&self, delta: Vec3, space: Space) {
        self.graph.translate(self.key, delta, space);
    }

    /// Rotate by `theta` radians about `axis` expressed in `space`. Marks the
    /// subtree stale.
    pub fn rotate(&self, theta: f32, axis: Vec3, space: Space) {
        self.graph.rotate(self.key, theta, axis, space);
    }

    /// Whether the cached world-space state is stale.
    pub fn is_dirty(&self) -> bool {
        self.graph.is_dirty(self.key)
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && Arc::ptr_eq(&self.graph, &other.graph)
    }
}

impl Eq for Transform {}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("local_position", &self.local_position())
            .field("local_rotation", &self.local_rotation())
            .field("dirty", &self.is_dirty())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{axis_angle, constants::PI};
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1.0e-5;

    fn node(graph: &Arc<SceneGraph>) -> Transform {
        Transform::new(Arc::clone(graph), graph.insert_node())
    }

    #[test]
    fn root_world_state_equals_local_state() {
        let graph = Arc::new(SceneGraph::new());
        let t = node(&graph);
        t.set_local_position(Vec3::new(1.0, 2.0, 3.0));
        t.set_local_rotation(axis_angle(world_up(), PI / 3.0));

        assert_relative_eq!(t.world_position(), t.local_position(), epsilon = EPSILON);
        assert_relative_eq!(t.world_rotation(), t.local_rotation(), epsilon = EPSILON);
    }

    #[test]
    fn child_offset_composes_through_parent() {
        let graph = Arc::new(SceneGraph::new());
        let a = node(&graph);
        let b = node(&graph);
        b.set_parent(&a).unwrap();
        b.set_local_position(Vec3::new(0.0, 0.0, 1.0));

        // Identity parent: child world position is its local offset.
        assert_relative_eq!(b.world_position(), Vec3::new(0.0, 0.0, 1.0), epsilon = EPSILON);

        // Quarter turn of the parent about world up swings the child around.
        a.rotate(PI / 2.0, world_up(), Space::World);
        assert_relative_eq!(b.world_position(), Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn dirty_propagates_down_and_clears_along_pulled_path() {
        let graph = Arc::new(SceneGraph::new());
        let a = node(&graph);
        let b = node(&graph);
        let c = node(&graph);
        let sibling = node(&graph);
        b.set_parent(&a).unwrap();
        c.set_parent(&b).unwrap();
        sibling.set_parent(&a).unwrap();

        // Settle all caches.
        c.world_position();
        sibling.world_position();
        assert!(!a.is_dirty() && !b.is_dirty() && !c.is_dirty() && !sibling.is_dirty());

        // Mutating the root invalidates the whole subtree eagerly.
        a.set_local_position(Vec3::new(5.0, 0.0, 0.0));
        assert!(a.is_dirty() && b.is_dirty() && c.is_dirty() && sibling.is_dirty());

        // Pulling the leaf cleans the climbed path only.
        let world = c.world_position();
        assert_relative_eq!(world, Vec3::new(5.0, 0.0, 0.0), epsilon = EPSILON);
        assert!(!a.is_dirty() && !b.is_dirty() && !c.is_dirty());
        assert!(sibling.is_dirty());
    }

    #[test]
    fn reparenting_moves_child_set_membership_exactly_once() {
        let graph = Arc::new(SceneGraph::new());
        let old_parent = node(&graph);
        let new_parent = node(&graph);
        let child = node(&graph);

        child.set_parent(&old_parent).unwrap();
        assert_eq!(old_parent.children().len(), 1);

        child.set_parent(&new_parent).unwrap();
        assert!(old_parent.children().is_empty());
        assert_eq!(new_parent.children(), vec![child.clone()]);
        assert_eq!(child.parent(), Some(new_parent.clone()));

        // Re-linking to the same parent does not duplicate the membership.
        child.set_parent(&new_parent).unwrap();
        assert_eq!(new_parent.children().len(), 1);
    }

    #[test]
    fn reparenting_rejects_cycles() {
        let graph = Arc::new(SceneGraph::new());
        let a = node(&graph);
        let b = node(&graph);
        let c = node(&graph);
        b.set_parent(&a).unwrap();
        c.set_parent(&b).unwrap();

        assert_eq!(a.set_parent(&c), Err(SceneError::Cycle));
        assert_eq!(a.set_parent(&a), Err(SceneError::Cycle));
        // The failed calls left the tree unchanged.
        assert!(a.parent().is_none());
        assert_eq!(c.parent(), Some(b));
    }

    #[test]
    fn local_translation_follows_facing_direction() {
        let graph = Arc::new(SceneGraph::new());
        let t = node(&graph);
        t.rotate(PI / 2.0, world_up(), Space::Local);
        t.translate(Vec3::new(0.0, 0.0, 1.0), Space::Local);

        // Facing +X after the quarter turn, "forward one unit" lands on +X.
        assert_relative_eq!(t.world_position(), Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn world_translation_is_world_correct_under_rotated_parent() {
        let graph = Arc::new(SceneGraph::new());
        let parent = node(&graph);
        let child = node(&graph);
        child.set_parent(&parent).unwrap();
        parent.rotate(PI / 2.0, world_up(), Space::World);

        child.translate(Vec3::new(1.0, 0.0, 0.0), Space::World);
        assert_relative_eq!(
            child.world_position(),
            Vec3::new(1.0, 0.0, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn world_rotation_spins_about_axis_fixed_in_world_space() {
        let graph = Arc::new(SceneGraph::new());
        let parent = node(&graph);
        let child = node(&graph);
        child.set_parent(&parent).unwrap();
        parent.rotate(PI / 2.0, world_up(), Space::Local);

        // Rotating the child about world up must cancel exactly with an
        // equal and opposite parent rotation.
        child.rotate(-PI / 2.0, world_up(), Space::World);
        assert_relative_eq!(child.forward(), world_forward(), epsilon = EPSILON);
    }

    #[test]
    fn detach_children_orphans_every_child() {
        let graph = Arc::new(SceneGraph::new());
        let parent = node(&graph);
        let x = node(&graph);
        let y = node(&graph);
        x.set_parent(&parent).unwrap();
        y.set_parent(&parent).unwrap();
        x.world_position();
        y.world_position();

        parent.detach_children();
        assert!(parent.children().is_empty());
        assert!(x.parent().is_none() && y.parent().is_none());
        assert!(x.is_dirty() && y.is_dirty());
        assert_eq!(x.root(), x);
    }

    #[test]
    fn basis_axes_follow_world_rotation() {
        let graph = Arc::new(SceneGraph::new());
        let t = node(&graph);
        t.rotate(PI / 2.0, world_up(), Space::Local);

        assert_relative_eq!(t.forward(), Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(t.along(), Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
        assert_relative_eq!(t.up(), world_up(), epsilon = EPSILON);
    }

    #[test]
    fn removed_node_goes_inert() {
        let graph = Arc::new(SceneGraph::new());
        let parent = node(&graph);
        let child = node(&graph);
        child.set_parent(&parent).unwrap();

        graph.remove_node(parent.key());
        assert!(!parent.is_alive());
        assert!(child.is_alive());
        assert!(child.parent().is_none());

        // Reads return identity values, writes are ignored.
        parent.translate(Vec3::new(1.0, 0.0, 0.0), Space::World);
        assert_eq!(parent.world_position(), Vec3::zeros());
        assert_eq!(child.set_parent(&parent), Err(SceneError::Detached));
    }
}
