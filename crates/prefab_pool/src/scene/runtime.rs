//! Scene runtime implementation

use crate::foundation::collections::{key_bits, new_key_type, HandleMap};
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::pool::{EntityRuntime, HideFlags, PoolObject, PrototypeKey};
use crate::scene::{Prefab, SceneNode};
use thiserror::Error;

new_key_type! {
    /// Handle to a node in a [`SceneRuntime`]
    pub struct NodeId;

    /// Handle to a prefab registered with a [`SceneRuntime`]
    pub struct PrefabId;
}

/// Scene runtime errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Prefab was never registered or has been unregistered
    #[error("Prefab not found: {0:?}")]
    PrefabNotFound(PrefabId),

    /// Node handle is dead
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Reparenting would put a node below itself
    #[error("Cannot parent {node:?} under {parent:?}: would create a cycle")]
    InvalidParent {
        /// Node being moved
        node: NodeId,
        /// Requested parent
        parent: NodeId,
    },
}

/// In-memory scene graph implementing [`EntityRuntime`]
pub struct SceneRuntime {
    prefabs: HandleMap<PrefabId, Prefab>,
    nodes: HandleMap<NodeId, SceneNode>,
    active_scene: String,
}

impl SceneRuntime {
    /// Create an empty runtime with a scene called "Main"
    pub fn new() -> Self {
        Self {
            prefabs: HandleMap::with_key(),
            nodes: HandleMap::with_key(),
            active_scene: "Main".to_string(),
        }
    }

    /// Register a prefab
    pub fn register_prefab(&mut self, prefab: Prefab) -> PrefabId {
        let name = prefab.name().to_string();
        let id = self.prefabs.insert(prefab);
        log::debug!("Registered prefab \"{}\" as {:?}", name, id);
        id
    }

    /// Unregister a prefab; existing instances are unaffected
    pub fn unregister_prefab(&mut self, id: PrefabId) -> Option<Prefab> {
        self.prefabs.remove(id)
    }

    /// Look up a registered prefab
    pub fn prefab(&self, id: PrefabId) -> Option<&Prefab> {
        self.prefabs.get(id)
    }

    /// Create an empty, active root node
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        self.nodes.insert(SceneNode::new(name, Transform::identity(), true))
    }

    /// Attach a pool-object component after construction
    pub fn attach_component(
        &mut self,
        node: NodeId,
        component: Box<dyn PoolObject>,
    ) -> Result<(), SceneError> {
        self.node_mut(node)?.components.push(component);
        Ok(())
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Whether the handle is alive
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Direct children of a node (empty for dead handles)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(SceneNode::children).unwrap_or_default()
    }

    /// Every node without a parent
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Transform of a node in world space
    pub fn world_transform(&self, id: NodeId) -> Option<Transform> {
        let node = self.nodes.get(id)?;
        match node.parent {
            Some(parent) => Some(self.world_transform(parent)?.combine(&node.transform)),
            None => Some(node.transform),
        }
    }

    /// Name of the current scene
    pub fn active_scene(&self) -> &str {
        &self.active_scene
    }

    /// Switch scenes, destroying every non-persistent root and its hierarchy
    ///
    /// Returns the number of nodes destroyed.
    pub fn load_scene(&mut self, name: impl Into<String>) -> usize {
        let name = name.into();
        let doomed: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none() && !node.persistent)
            .map(|(id, _)| id)
            .collect();

        let destroyed: usize = doomed.into_iter().map(|id| self.remove_subtree(id)).sum();
        log::info!(
            "Loaded scene \"{}\" (was \"{}\"), destroyed {} nodes",
            name,
            self.active_scene,
            destroyed
        );
        self.active_scene = name;
        destroyed
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(id).ok_or(SceneError::NodeNotFound(id))
    }

    fn is_descendant_or_self(&self, candidate: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(candidate);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|node| node.parent);
        }
        false
    }

    /// Remove a node and everything below it, returning how many were removed
    fn remove_subtree(&mut self, id: NodeId) -> usize {
        if let Some(parent) = self.nodes.get(id).and_then(|node| node.parent) {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|&child| child != id);
            }
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        removed
    }
}

impl Default for SceneRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRuntime for SceneRuntime {
    type Prototype = PrefabId;
    type Node = NodeId;
    type Error = SceneError;

    fn identity_of(&self, prototype: &PrefabId) -> PrototypeKey {
        PrototypeKey::new(key_bits(*prototype))
    }

    fn create_container(&mut self, name: &str) -> Result<NodeId, SceneError> {
        Ok(self.create_node(name))
    }

    fn construct(
        &mut self,
        prototype: &PrefabId,
        position: Vec3,
        orientation: Quat,
    ) -> Result<NodeId, SceneError> {
        let prefab = self
            .prefabs
            .get(*prototype)
            .ok_or(SceneError::PrefabNotFound(*prototype))?;

        let mut transform = Transform::from_position_rotation(position, orientation);
        transform.scale = prefab.scale();
        let mut node = SceneNode::new(format!("{}(Clone)", prefab.name()), transform, false);
        node.prefab = Some(*prototype);
        node.components = prefab.instantiate_components();

        Ok(self.nodes.insert(node))
    }

    fn destroy(&mut self, node: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(node) {
            return Err(SceneError::NodeNotFound(node));
        }
        self.remove_subtree(node);
        Ok(())
    }

    fn is_alive(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    fn is_active(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(SceneNode::is_active)
    }

    fn set_active(&mut self, node: NodeId, active: bool) -> Result<(), SceneError> {
        self.node_mut(node)?.active = active;
        Ok(())
    }

    fn set_transform(
        &mut self,
        node: NodeId,
        position: Vec3,
        orientation: Quat,
    ) -> Result<(), SceneError> {
        let node = self.node_mut(node)?;
        node.transform.position = position;
        node.transform.rotation = orientation;
        Ok(())
    }

    fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        let old_parent = self.node_mut(node)?.parent;
        if let Some(parent) = parent {
            if !self.nodes.contains_key(parent) {
                return Err(SceneError::NodeNotFound(parent));
            }
            if self.is_descendant_or_self(parent, node) {
                return Err(SceneError::InvalidParent { node, parent });
            }
        }
        if old_parent == parent {
            return Ok(());
        }

        if let Some(old) = old_parent.and_then(|id| self.nodes.get_mut(id)) {
            old.children.retain(|&child| child != node);
        }
        if let Some(new) = parent.and_then(|id| self.nodes.get_mut(id)) {
            new.children.push(node);
        }
        self.node_mut(node)?.parent = parent;
        Ok(())
    }

    fn set_persistent(&mut self, node: NodeId, persistent: bool) -> Result<(), SceneError> {
        self.node_mut(node)?.persistent = persistent;
        Ok(())
    }

    fn set_hide_flags(&mut self, node: NodeId, flags: HideFlags) -> Result<(), SceneError> {
        self.node_mut(node)?.hide_flags = flags;
        Ok(())
    }

    fn for_each_pool_object(
        &mut self,
        node: NodeId,
        visit: &mut dyn FnMut(&mut dyn PoolObject),
    ) -> Result<(), SceneError> {
        for component in &mut self.node_mut(node)?.components {
            visit(component.as_mut());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Tagged {
        tag: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl PoolObject for Tagged {
        fn on_spawn(&mut self) {
            self.log.borrow_mut().push(self.tag);
        }

        fn on_despawn(&mut self) {}
    }

    #[test]
    fn test_construct_is_inactive_and_named() {
        let mut scene = SceneRuntime::new();
        let prefab = scene.register_prefab(Prefab::new("Asteroid").with_scale(Vec3::new(2.0, 2.0, 2.0)));

        let node = scene
            .construct(&prefab, Vec3::new(1.0, 0.0, 0.0), Quat::identity())
            .unwrap();
        let data = scene.node(node).unwrap();

        assert!(!data.is_active());
        assert_eq!(data.name(), "Asteroid(Clone)");
        assert_eq!(data.prefab(), Some(prefab));
        assert_relative_eq!(data.transform().position, Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(data.transform().scale, Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_identity_is_stable_and_distinct() {
        let mut scene = SceneRuntime::new();
        let a = scene.register_prefab(Prefab::new("A"));
        let b = scene.register_prefab(Prefab::new("B"));

        assert_eq!(scene.identity_of(&a), scene.identity_of(&a));
        assert_ne!(scene.identity_of(&a), scene.identity_of(&b));
    }

    #[test]
    fn test_components_visited_in_attachment_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (first, second) = (log.clone(), log.clone());
        let mut scene = SceneRuntime::new();
        let prefab = scene.register_prefab(
            Prefab::new("Ship")
                .with_component(move || Box::new(Tagged { tag: "engine", log: first.clone() }))
                .with_component(move || Box::new(Tagged { tag: "weapon", log: second.clone() })),
        );

        let node = scene.construct(&prefab, Vec3::zeros(), Quat::identity()).unwrap();
        scene
            .for_each_pool_object(node, &mut |object| object.on_spawn())
            .unwrap();

        assert_eq!(*log.borrow(), vec!["engine", "weapon"]);
        assert_eq!(scene.node(node).unwrap().component_count(), 2);
    }

    #[test]
    fn test_destroy_removes_subtree() {
        let mut scene = SceneRuntime::new();
        let root = scene.create_node("Root");
        let child = scene.create_node("Child");
        let grandchild = scene.create_node("Grandchild");
        scene.set_parent(child, Some(root)).unwrap();
        scene.set_parent(grandchild, Some(child)).unwrap();

        scene.destroy(child).unwrap();

        assert!(scene.contains(root));
        assert!(!scene.contains(child));
        assert!(!scene.contains(grandchild));
        assert!(scene.children(root).is_empty());
        assert_eq!(scene.destroy(child), Err(SceneError::NodeNotFound(child)));
    }

    #[test]
    fn test_set_parent_rejects_cycles() {
        let mut scene = SceneRuntime::new();
        let a = scene.create_node("A");
        let b = scene.create_node("B");
        scene.set_parent(b, Some(a)).unwrap();

        assert_eq!(
            scene.set_parent(a, Some(b)),
            Err(SceneError::InvalidParent { node: a, parent: b })
        );
        assert!(matches!(scene.set_parent(a, Some(a)), Err(SceneError::InvalidParent { .. })));
    }

    #[test]
    fn test_reparent_moves_child_lists() {
        let mut scene = SceneRuntime::new();
        let a = scene.create_node("A");
        let b = scene.create_node("B");
        let item = scene.create_node("Item");

        scene.set_parent(item, Some(a)).unwrap();
        scene.set_parent(item, Some(b)).unwrap();
        assert!(scene.children(a).is_empty());
        assert_eq!(scene.children(b), &[item]);

        scene.set_parent(item, None).unwrap();
        assert!(scene.children(b).is_empty());
        assert_eq!(scene.node(item).unwrap().parent(), None);
    }

    #[test]
    fn test_world_transform_follows_parent() {
        let mut scene = SceneRuntime::new();
        let parent = scene.create_node("Parent");
        let child = scene.create_node("Child");
        scene
            .set_transform(parent, Vec3::new(5.0, 0.0, 0.0), Quat::identity())
            .unwrap();
        scene
            .set_transform(child, Vec3::new(0.0, 1.0, 0.0), Quat::identity())
            .unwrap();
        scene.set_parent(child, Some(parent)).unwrap();

        let world = scene.world_transform(child).unwrap();
        assert_relative_eq!(world.position, Vec3::new(5.0, 1.0, 0.0));
    }

    #[test]
    fn test_load_scene_keeps_persistent_roots() {
        let mut scene = SceneRuntime::new();
        let keeper = scene.create_node("Keeper");
        let keeper_child = scene.create_node("KeeperChild");
        let level = scene.create_node("Level");
        scene.set_parent(keeper_child, Some(keeper)).unwrap();
        scene.set_persistent(keeper, true).unwrap();

        let destroyed = scene.load_scene("Level2");

        assert_eq!(destroyed, 1);
        assert_eq!(scene.active_scene(), "Level2");
        assert!(scene.contains(keeper));
        assert!(scene.contains(keeper_child));
        assert!(!scene.contains(level));
        assert_eq!(scene.roots(), vec![keeper]);
    }

    #[test]
    fn test_construct_unknown_prefab_fails() {
        let mut scene = SceneRuntime::new();
        let prefab = scene.register_prefab(Prefab::new("Temp"));
        assert!(scene.unregister_prefab(prefab).is_some());

        let result = scene.construct(&prefab, Vec3::zeros(), Quat::identity());
        assert_eq!(result, Err(SceneError::PrefabNotFound(prefab)));
    }
}
