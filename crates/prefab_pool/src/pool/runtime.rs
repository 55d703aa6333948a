//! Entity runtime capability
//!
//! The pool never builds, moves or destroys entities itself. Everything that
//! touches the host's scene graph goes through [`EntityRuntime`], so the same
//! pool logic works against any engine that can provide these primitives.

use crate::foundation::math::{Quat, Vec3};
use crate::pool::PoolObject;
use bitflags::bitflags;
use std::fmt::Debug;
use std::hash::Hash;

/// Stable identity of a prototype
///
/// Two lookups for the same prototype must produce the same key; different
/// prototypes must never share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrototypeKey(u64);

impl PrototypeKey {
    /// Wrap a raw identity value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identity value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PrototypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "prototype#{:x}", self.0)
    }
}

bitflags! {
    /// Editor and serialization visibility of a node
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HideFlags: u8 {
        /// Not shown in hierarchy views
        const HIDE_IN_HIERARCHY = 1 << 0;
        /// Never written out when the scene is saved
        const DONT_SAVE = 1 << 1;
        /// Hidden and never saved
        const HIDE_AND_DONT_SAVE = Self::HIDE_IN_HIERARCHY.bits() | Self::DONT_SAVE.bits();
    }
}

/// Host-side primitives the pool is built on
///
/// Nodes returned by [`construct`](Self::construct) start out inactive. All
/// mutators report dead or unknown handles through [`Self::Error`].
pub trait EntityRuntime {
    /// Template type instances are created from
    type Prototype: ?Sized;

    /// Handle to a live node (pooled instances and the pool container alike)
    type Node: Copy + Eq + Hash + Debug;

    /// Failure reported by the host
    type Error: std::error::Error + 'static;

    /// Stable identity of a prototype
    fn identity_of(&self, prototype: &Self::Prototype) -> PrototypeKey;

    /// Create an empty root node used to park free instances
    fn create_container(&mut self, name: &str) -> Result<Self::Node, Self::Error>;

    /// Build a new inactive instance of `prototype`
    fn construct(
        &mut self,
        prototype: &Self::Prototype,
        position: Vec3,
        orientation: Quat,
    ) -> Result<Self::Node, Self::Error>;

    /// Irreversibly free a node and everything below it
    fn destroy(&mut self, node: Self::Node) -> Result<(), Self::Error>;

    /// Whether the handle still refers to a node
    ///
    /// Scene transitions or host code may destroy pooled nodes without going
    /// through the pool; the pool uses this to drop such handles.
    fn is_alive(&self, node: Self::Node) -> bool;

    /// Whether the node is currently active (`false` for dead handles)
    fn is_active(&self, node: Self::Node) -> bool;

    /// Activate or deactivate a node
    fn set_active(&mut self, node: Self::Node, active: bool) -> Result<(), Self::Error>;

    /// Move and orient a node
    fn set_transform(
        &mut self,
        node: Self::Node,
        position: Vec3,
        orientation: Quat,
    ) -> Result<(), Self::Error>;

    /// Reparent a node, `None` meaning the scene root
    fn set_parent(&mut self, node: Self::Node, parent: Option<Self::Node>) -> Result<(), Self::Error>;

    /// Mark a root node as surviving (or not) the next scene transition
    fn set_persistent(&mut self, node: Self::Node, persistent: bool) -> Result<(), Self::Error>;

    /// Set editor/serialization visibility
    fn set_hide_flags(&mut self, node: Self::Node, flags: HideFlags) -> Result<(), Self::Error>;

    /// Visit every [`PoolObject`] attached to `node`, in attachment order
    fn for_each_pool_object(
        &mut self,
        node: Self::Node,
        visit: &mut dyn FnMut(&mut dyn PoolObject),
    ) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hide_and_dont_save_contains_both() {
        assert!(HideFlags::HIDE_AND_DONT_SAVE.contains(HideFlags::DONT_SAVE));
        assert!(HideFlags::HIDE_AND_DONT_SAVE.contains(HideFlags::HIDE_IN_HIERARCHY));
        assert!(!HideFlags::DONT_SAVE.contains(HideFlags::HIDE_IN_HIERARCHY));
    }

    #[test]
    fn test_prototype_key_display() {
        assert_eq!(PrototypeKey::new(0x2a).to_string(), "prototype#2a");
        assert_eq!(PrototypeKey::new(7).raw(), 7);
    }
}
