//! Scene nodes

use crate::foundation::math::Transform;
use crate::pool::{HideFlags, PoolObject};
use crate::scene::{NodeId, PrefabId};

/// One object in the scene hierarchy
pub struct SceneNode {
    pub(crate) name: String,
    pub(crate) transform: Transform,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) active: bool,
    pub(crate) persistent: bool,
    pub(crate) hide_flags: HideFlags,
    pub(crate) prefab: Option<PrefabId>,
    pub(crate) components: Vec<Box<dyn PoolObject>>,
}

impl SceneNode {
    pub(crate) fn new(name: impl Into<String>, transform: Transform, active: bool) -> Self {
        Self {
            name: name.into(),
            transform,
            parent: None,
            children: Vec::new(),
            active,
            persistent: false,
            hide_flags: HideFlags::empty(),
            prefab: None,
            components: Vec::new(),
        }
    }

    /// Node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transform relative to the parent
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Parent node, `None` for roots
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children in attachment order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Own active flag
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether this node survives scene transitions (only meaningful on roots)
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Editor/serialization visibility
    pub fn hide_flags(&self) -> HideFlags {
        self.hide_flags
    }

    /// Prefab this node was built from
    pub fn prefab(&self) -> Option<PrefabId> {
        self.prefab
    }

    /// Number of attached pool-object components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

impl std::fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNode")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children.len())
            .field("active", &self.active)
            .field("persistent", &self.persistent)
            .field("hide_flags", &self.hide_flags)
            .field("components", &self.components.len())
            .finish()
    }
}
